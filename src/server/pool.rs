//! Fixed-Size Worker Pool
//!
//! Connection handling runs on a fixed set of long-lived worker threads
//! instead of one thread per request. The acceptor enqueues a task per
//! connection; workers drain the queue for the lifetime of the pool.
//!
//! ## How a worker runs
//!
//! ```text
//! loop:
//!   lock the queue
//!   wait until the queue is non-empty or shutdown is signaled
//!   if shutting down and the queue is empty → exit
//!   pop one task, unlock
//!   run the task (outside the lock)
//! ```
//!
//! The task always runs outside the queue lock - a slow connection must
//! never block other producers or workers from touching the queue.
//!
//! ## Shutdown
//!
//! `shutdown()` (also run on drop) sets the shutdown flag, wakes every
//! worker, and joins them all before returning. Workers finish the tasks
//! already queued first, so no task execution outlives the pool. The flag
//! is stored while holding the queue mutex: a worker that has just checked
//! it and is about to wait cannot miss the wakeup.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// A unit of work executed exactly once by exactly one worker.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// State shared between the pool handle and its workers.
#[derive(Default)]
struct PoolShared {
    /// FIFO task queue; unbounded, so `submit` never blocks the producer
    queue: Mutex<VecDeque<Task>>,
    /// Signaled when a task is enqueued or shutdown begins
    available: Condvar,
    /// Set (under the queue lock) when the pool is shutting down
    shutdown: AtomicBool,
}

/// A fixed set of worker threads draining a shared task queue.
///
/// # Example
///
/// ```
/// use hearthkv::server::WorkerPool;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let pool = WorkerPool::new(4).expect("failed to spawn workers");
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..100 {
///     let counter = Arc::clone(&counter);
///     pool.submit(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     });
/// }
///
/// drop(pool); // joins the workers; every submitted task has run
/// assert_eq!(counter.load(Ordering::SeqCst), 100);
/// ```
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool with `size` worker threads.
    ///
    /// Thread-creation failure is fatal to construction: already-spawned
    /// workers are shut down and the `io::Error` is returned.
    pub fn new(size: usize) -> io::Result<Self> {
        let shared = Arc::new(PoolShared::default());
        let mut workers = Vec::with_capacity(size);

        for i in 0..size {
            let worker_shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("hearthkv-worker-{}", i))
                .spawn(move || worker_loop(worker_shared));

            match handle {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    let mut partial = Self { shared, workers };
                    partial.shutdown();
                    return Err(e);
                }
            }
        }

        info!(workers = size, "worker pool created");
        Ok(Self { shared, workers })
    }

    /// Enqueues a task and wakes one idle worker.
    ///
    /// Never blocks the submitter: the queue is unbounded and applies no
    /// backpressure.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut queue = self.shared.queue.lock().unwrap();
            queue.push_back(Box::new(task));
        }
        self.shared.available.notify_one();
    }

    /// Signals shutdown, wakes every worker, and joins them all.
    ///
    /// Tasks already in the queue are executed before the workers exit;
    /// once this returns, no task is running or pending. Idempotent.
    pub fn shutdown(&mut self) {
        {
            // Holding the lock while storing the flag closes the window
            // between a worker's flag check and its wait
            let _queue = self.shared.queue.lock().unwrap();
            self.shared.shutdown.store(true, Ordering::SeqCst);
        }
        self.shared.available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
        info!("worker pool shut down");
    }
}

/// The loop each worker runs: dequeue FIFO, execute outside the lock.
fn worker_loop(shared: Arc<PoolShared>) {
    loop {
        let task = {
            let mut queue = shared.queue.lock().unwrap();

            loop {
                if let Some(task) = queue.pop_front() {
                    break task;
                }
                if shared.shutdown.load(Ordering::SeqCst) {
                    debug!("worker exiting on shutdown");
                    return;
                }
                queue = shared.available.wait(queue).unwrap();
            }
            // Queue lock released here, before the task runs
        };

        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn test_executes_every_task_exactly_once() {
        // More tasks than workers: each runs exactly once
        let pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..200 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        drop(pool);
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn test_shutdown_drains_pending_tasks() {
        let pool = WorkerPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        // The single worker is held up by the first task while the rest
        // pile into the queue
        let gate = Arc::new(Barrier::new(2));
        {
            let gate = Arc::clone(&gate);
            pool.submit(move || {
                gate.wait();
                thread::sleep(Duration::from_millis(50));
            });
        }
        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        gate.wait();
        drop(pool); // shutdown must not return before the queue is drained

        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_single_worker_preserves_submission_order() {
        let pool = WorkerPool::new(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50 {
            let order = Arc::clone(&order);
            pool.submit(move || {
                order.lock().unwrap().push(i);
            });
        }

        drop(pool);

        // One worker dequeues FIFO, so completion order equals queue order
        let order = order.lock().unwrap();
        assert_eq!(*order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_execution_across_workers() {
        let pool = WorkerPool::new(4).unwrap();
        let rendezvous = Arc::new(Barrier::new(4));

        // Four tasks that can only all finish if they run concurrently
        for _ in 0..4 {
            let rendezvous = Arc::clone(&rendezvous);
            pool.submit(move || {
                rendezvous.wait();
            });
        }

        drop(pool); // would hang forever if tasks ran sequentially
    }

    #[test]
    fn test_submit_from_multiple_producers() {
        let pool = Arc::new(WorkerPool::new(4).unwrap());
        let counter = Arc::new(AtomicUsize::new(0));
        let mut producers = Vec::new();

        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            let counter = Arc::clone(&counter);
            producers.push(thread::spawn(move || {
                for _ in 0..50 {
                    let counter = Arc::clone(&counter);
                    pool.submit(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    });
                }
            }));
        }

        for producer in producers {
            producer.join().unwrap();
        }

        drop(Arc::try_unwrap(pool).ok().expect("pool still shared"));
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn test_shutdown_with_empty_queue() {
        let mut pool = WorkerPool::new(2).unwrap();
        pool.shutdown();
        pool.shutdown(); // idempotent
    }
}
