//! HearthKV - An In-Memory Key-Value Store Served over HTTP
//!
//! This is the main entry point for the HearthKV server. It parses the
//! command line, sets up logging, wires the store, sweeper, and TCP server
//! together, and tears them down in the right order on Ctrl+C.

use hearthkv::api::KvApi;
use hearthkv::connection::{handle_connection, ConnectionStats};
use hearthkv::http::Router;
use hearthkv::server::TcpServer;
use hearthkv::storage::{ExpirySweeper, KvStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Number of worker threads
    workers: usize,
    /// Seconds between expiry sweeps
    sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: hearthkv::DEFAULT_HOST.to_string(),
            port: hearthkv::DEFAULT_PORT,
            workers: hearthkv::DEFAULT_WORKERS,
            sweep_interval_secs: 1,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--workers" | "-w" => {
                    if i + 1 < args.len() {
                        config.workers = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid worker count");
                            std::process::exit(1);
                        });
                        if config.workers == 0 {
                            eprintln!("Error: worker count must be at least 1");
                            std::process::exit(1);
                        }
                        i += 2;
                    } else {
                        eprintln!("Error: --workers requires a value");
                        std::process::exit(1);
                    }
                }
                "--sweep-interval" => {
                    if i + 1 < args.len() {
                        config.sweep_interval_secs = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid sweep interval");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --sweep-interval requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("HearthKV version {}", hearthkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
HearthKV - An In-Memory Key-Value Store Served over HTTP

USAGE:
    hearthkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>            Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>            Port to listen on (default: 8080)
    -w, --workers <N>            Worker threads (default: 4)
        --sweep-interval <SECS>  Seconds between expiry sweeps (default: 1)
    -v, --version                Print version information
        --help                   Print this help message

EXAMPLES:
    hearthkv                        # Start on 127.0.0.1:8080
    hearthkv --port 9000            # Start on port 9000
    hearthkv --host 0.0.0.0 -w 8    # All interfaces, 8 workers

USING THE API:
    $ curl -X PUT -d 'World' http://localhost:8080/kv/hello
    OK
    $ curl http://localhost:8080/kv/hello
    World
    $ curl -X PUT -d 'gone soon' -H 'X-TTL: 30' http://localhost:8080/kv/temp
    OK
    $ curl http://localhost:8080/kv
    hello
    temp
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
 _   _                _   _     _  ____   __
| | | | ___  __ _ _ _| |_| |__ | |/ /\ \ / /
| |_| |/ _ \/ _` | '_|  _| '_ \| ' <  \ V /
|_| |_|\___/\__,_|_|  \__|_| |_|_|\_\  \_/

HearthKV v{} - In-Memory Key-Value Store over HTTP
--------------------------------------------------
Server starting on {}
Use Ctrl+C to shutdown gracefully.
"#,
        hearthkv::VERSION,
        config.bind_address()
    );
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Create the storage engine (shared across all connections)
    let store = Arc::new(KvStore::new());
    info!("store initialized");

    // Start the background expiry sweeper
    let mut sweeper = ExpirySweeper::with_interval(
        Arc::clone(&store),
        Duration::from_secs(config.sweep_interval_secs),
    );
    sweeper.start()?;

    // Wire the REST API into the router
    let mut router = Router::new();
    KvApi::new(Arc::clone(&store)).register_routes(&mut router);
    let router = Arc::new(router);

    // Connection statistics shared by all workers
    let stats = Arc::new(ConnectionStats::new());

    // Create the server and its worker pool
    let server = Arc::new(TcpServer::new(
        config.host.clone(),
        config.port,
        config.workers,
    )?);

    // Ctrl+C requests the accept loop to stop. The loop observes the flag
    // after the next accepted connection, then start() returns.
    {
        let server = Arc::clone(&server);
        ctrlc::set_handler(move || {
            info!("shutdown signal received, stopping server...");
            server.stop();
        })?;
    }

    // Main accept loop; blocks until stop() is observed
    server.start(move |stream, peer| {
        handle_connection(stream, peer, Arc::clone(&router), Arc::clone(&stats));
    });

    // Teardown order: the sweeper stops before the store it references is
    // dropped; the pool joins its workers when the server drops.
    sweeper.stop();

    info!("server shutdown complete");
    Ok(())
}
