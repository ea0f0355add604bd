//! Connection Acceptor
//!
//! Owns the listening socket and the [`WorkerPool`]. The accept loop runs
//! on the caller's thread: every accepted connection becomes one pool task
//! that runs the connection handler and closes the stream when it returns.
//!
//! ```text
//! start(handler)
//!   bind + listen          (failure: logged, start returns)
//!   loop until stop():
//!     accept()             (blocks)
//!     pool.submit(|| handler(stream, peer))
//! ```
//!
//! ## Stopping
//!
//! `stop()` only sets a flag; it does not interrupt a blocked `accept`.
//! The loop observes the flag after the next connection arrives (or the
//! listener errors), so one extra connection may be admitted after `stop()`
//! is called. The listening socket closes when `start` returns and its
//! scope ends.

use crate::server::WorkerPool;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, error, info};

/// A TCP server: blocking accept loop in front of a fixed worker pool.
///
/// # Example
///
/// ```no_run
/// use hearthkv::server::TcpServer;
///
/// let server = TcpServer::new("127.0.0.1", 8080, 4).expect("failed to create worker pool");
///
/// // Blocks until stop() is observed
/// server.start(|stream, peer| {
///     // handle the connection; the stream closes when this returns
///     let _ = (stream, peer);
/// });
/// ```
pub struct TcpServer {
    host: String,
    port: u16,
    pool: WorkerPool,
    stop_requested: AtomicBool,
    /// Address actually bound, filled in by `start` (port 0 picks a free one)
    bound_addr: Mutex<Option<SocketAddr>>,
}

impl TcpServer {
    /// Creates the server and its worker pool.
    ///
    /// The listening socket is not created until [`TcpServer::start`];
    /// worker-thread creation failure is fatal and returned here.
    pub fn new(host: impl Into<String>, port: u16, workers: usize) -> io::Result<Self> {
        Ok(Self {
            host: host.into(),
            port,
            pool: WorkerPool::new(workers)?,
            stop_requested: AtomicBool::new(false),
            bound_addr: Mutex::new(None),
        })
    }

    /// Binds, listens, and accepts connections until [`TcpServer::stop`] is
    /// observed.
    ///
    /// Blocks the calling thread for the life of the accept loop. Each
    /// accepted connection is submitted to the worker pool as a task that
    /// invokes `handler` with exclusive ownership of the stream; the stream
    /// closes when the task's scope ends.
    ///
    /// If binding or listening fails, the error is logged and `start`
    /// returns without entering the loop; there is no retry.
    pub fn start<H>(&self, handler: H)
    where
        H: Fn(TcpStream, SocketAddr) + Send + Sync + 'static,
    {
        // std's bind sets SO_REUSEADDR on Unix, so a freshly-restarted
        // server can claim a port still in TIME_WAIT
        let listener = match TcpListener::bind((self.host.as_str(), self.port)) {
            Ok(listener) => listener,
            Err(e) => {
                error!(host = %self.host, port = self.port, error = %e, "failed to bind listener");
                return;
            }
        };

        match listener.local_addr() {
            Ok(addr) => {
                *self.bound_addr.lock().unwrap() = Some(addr);
                info!(%addr, "listening");
            }
            Err(e) => {
                error!(error = %e, "failed to read bound address");
                return;
            }
        }

        let handler = std::sync::Arc::new(handler);

        while !self.stop_requested.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    debug!(%peer, "connection accepted");
                    let handler = std::sync::Arc::clone(&handler);
                    self.pool.submit(move || (*handler)(stream, peer));
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        info!("accept loop stopped");
    }

    /// Requests the accept loop to exit.
    ///
    /// Only sets the stop flag. An `accept` already blocking when this is
    /// called may still admit one more connection before the loop observes
    /// the flag and exits.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        info!("server stop requested");
    }

    /// The address the listener actually bound, once `start` has bound it.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.bound_addr.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    /// Spins until the server reports its bound address.
    fn wait_for_addr(server: &TcpServer) -> SocketAddr {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(addr) = server.local_addr() {
                return addr;
            }
            assert!(Instant::now() < deadline, "server never bound");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_handler_runs_per_connection() {
        let server = Arc::new(TcpServer::new("127.0.0.1", 0, 2).unwrap());
        let served = Arc::new(AtomicUsize::new(0));

        let accept_thread = {
            let server = Arc::clone(&server);
            let served = Arc::clone(&served);
            thread::spawn(move || {
                server.start(move |mut stream, _peer| {
                    served.fetch_add(1, Ordering::SeqCst);
                    let _ = stream.write_all(b"hi");
                });
            })
        };

        let addr = wait_for_addr(&server);

        for _ in 0..3 {
            let mut client = TcpStream::connect(addr).unwrap();
            let mut buf = Vec::new();
            client.read_to_end(&mut buf).unwrap();
            assert_eq!(buf, b"hi");
        }

        assert_eq!(served.load(Ordering::SeqCst), 3);

        // stop() takes effect once the next accept returns
        server.stop();
        let _ = TcpStream::connect(addr);
        accept_thread.join().unwrap();
    }

    #[test]
    fn test_bind_failure_returns_without_looping() {
        // Hold the port so the server's bind fails
        let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let server = TcpServer::new("127.0.0.1", port, 1).unwrap();

        // Must log and return promptly instead of entering the accept loop
        server.start(|_stream, _peer| {});
        assert!(server.local_addr().is_none());
    }

    #[test]
    fn test_connections_fan_out_across_workers() {
        let server = Arc::new(TcpServer::new("127.0.0.1", 0, 4).unwrap());

        let accept_thread = {
            let server = Arc::clone(&server);
            thread::spawn(move || {
                server.start(move |mut stream, _peer| {
                    let mut byte = [0u8; 1];
                    // Echo one byte; blocks until the client sends it
                    if stream.read_exact(&mut byte).is_ok() {
                        let _ = stream.write_all(&byte);
                    }
                });
            })
        };

        let addr = wait_for_addr(&server);

        // Open several connections at once, then complete them in reverse:
        // only a pool with parallel workers can serve them all
        let mut clients: Vec<TcpStream> = (0..4).map(|_| TcpStream::connect(addr).unwrap()).collect();

        for (i, client) in clients.iter_mut().enumerate().rev() {
            client.write_all(&[i as u8]).unwrap();
            let mut byte = [0u8; 1];
            client.read_exact(&mut byte).unwrap();
            assert_eq!(byte[0], i as u8);
        }

        server.stop();
        let _ = TcpStream::connect(addr);
        accept_thread.join().unwrap();
    }
}
