//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{BreezeError, Result};
use crate::network::Connection;

/// TCP server for BreezeKV
///
/// One acceptor thread feeds accepted streams into a bounded channel; a
/// fixed pool of worker threads drains it, each worker handling one
/// connection at a time. The channel bound is the accept backlog promised
/// by `max_connections`.
pub struct Server {
    /// Server configuration
    config: Config,

    /// Shared storage engine
    engine: Arc<Engine>,

    /// Cooperative shutdown flag checked by the acceptor loop
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// How often the non-blocking acceptor re-checks the shutdown flag
    const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the server (blocking)
    ///
    /// Returns once `shutdown` has been signaled and all workers have
    /// drained, or on a fatal setup error.
    pub fn run(&self) -> Result<()> {
        self.config.validate()?;

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            BreezeError::Network(format!(
                "failed to bind {}: {}",
                self.config.listen_addr, e
            ))
        })?;
        // Non-blocking accept so the loop can notice the shutdown flag
        listener.set_nonblocking(true)?;

        tracing::info!("listening on {}", self.config.listen_addr);

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);
        let workers = self.spawn_workers(receiver)?;

        // Single acceptor loop
        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::debug!("accepted connection from {}", addr);
                    if sender.send(stream).is_err() {
                        // Workers are gone; nothing left to serve with
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Self::ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("accept failed: {}", e);
                }
            }
        }

        // Dropping the sender closes the channel; idle workers exit once
        // their recv() fails.
        drop(sender);
        for worker in workers {
            let _ = worker.join();
        }

        tracing::info!("server stopped");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Spawn the worker pool that handles accepted connections
    fn spawn_workers(&self, receiver: Receiver<TcpStream>) -> Result<Vec<thread::JoinHandle<()>>> {
        let mut workers = Vec::with_capacity(self.config.worker_threads);

        for worker_id in 0..self.config.worker_threads {
            let receiver = receiver.clone();
            let engine = Arc::clone(&self.engine);
            let read_timeout_ms = self.config.read_timeout_ms;
            let write_timeout_ms = self.config.write_timeout_ms;

            let handle = thread::Builder::new()
                .name(format!("breezekv-worker-{}", worker_id))
                .spawn(move || {
                    while let Ok(stream) = receiver.recv() {
                        let mut connection = match Connection::new(stream, Arc::clone(&engine)) {
                            Ok(connection) => connection,
                            Err(e) => {
                                tracing::warn!("failed to set up connection: {}", e);
                                continue;
                            }
                        };

                        if let Err(e) = connection.set_timeouts(read_timeout_ms, write_timeout_ms)
                        {
                            tracing::warn!(
                                "failed to set timeouts for {}: {}",
                                connection.peer_addr(),
                                e
                            );
                        }

                        if let Err(e) = connection.handle() {
                            tracing::warn!(
                                "connection from {} ended with error: {}",
                                connection.peer_addr(),
                                e
                            );
                        }
                    }
                })?;

            workers.push(handle);
        }

        Ok(workers)
    }
}
