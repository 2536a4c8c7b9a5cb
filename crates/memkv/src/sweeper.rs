//! Optional background reclamation of expired entries
//!
//! Expiration stays lazy without a sweeper; this only frees memory held by
//! entries nobody touches again. Reads answer the same way with or without it,
//! except that a purged key reports `KeyNotFound` instead of `KeyExpired`.

use crate::engine::KvEngine;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Command sent to the sweeper thread
enum SweepCommand {
    /// Run a pass now instead of waiting for the interval
    Sweep,

    /// Graceful shutdown
    Shutdown,
}

/// Handle to the background sweeper thread
///
/// Holds only a weak reference to the engine; the thread exits on its own
/// once every `Arc<KvEngine>` is gone.
pub struct Sweeper {
    sender: Sender<SweepCommand>,
    thread_handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Sweeper {
    /// Spawn a thread that purges expired entries every `interval`
    ///
    /// A zero interval is rejected with `InvalidInput`.
    pub fn spawn(engine: &Arc<KvEngine>, interval: Duration) -> std::io::Result<Self> {
        if interval.is_zero() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "sweep interval must be non-zero",
            ));
        }

        info!(interval_ms = interval.as_millis() as u64, "Starting sweeper thread");

        let (sender, receiver) = bounded::<SweepCommand>(16);
        let engine = Arc::downgrade(engine);

        let thread_handle = thread::Builder::new()
            .name("memkv-sweeper".to_string())
            .spawn(move || Self::sweep_loop(engine, receiver, interval))?;

        Ok(Self {
            sender,
            thread_handle: Some(thread_handle),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Request an immediate pass (non-blocking)
    pub fn sweep_now(&self) {
        if let Err(e) = self.sender.try_send(SweepCommand::Sweep) {
            debug!("Sweep request dropped: {}", e);
        }
    }

    fn sweep_loop(engine: Weak<KvEngine>, receiver: Receiver<SweepCommand>, interval: Duration) {
        loop {
            match receiver.recv_timeout(interval) {
                Ok(SweepCommand::Sweep) | Err(RecvTimeoutError::Timeout) => {
                    let Some(strong) = engine.upgrade() else {
                        debug!("Engine dropped, stopping sweeper");
                        break;
                    };
                    let removed = strong.purge_expired();
                    if removed > 0 {
                        debug!(removed, "Sweeper reclaimed expired entries");
                    }
                }

                Ok(SweepCommand::Shutdown) => {
                    debug!("Sweeper shutdown signal received");
                    break;
                }

                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Sweeper channel disconnected, shutting down");
                    break;
                }
            }
        }

        info!("Sweeper thread stopped");
    }

    fn shutdown_internal(&mut self) {
        let _ = self.sender.send(SweepCommand::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                error!("Failed to join sweeper thread: {:?}", e);
            }
        }
    }

    /// Stop the sweeper and wait for its thread to exit
    pub fn shutdown(mut self) {
        self.shutdown_internal();
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            warn!("Sweeper dropped without explicit shutdown, forcing shutdown");
            self.shutdown_internal();
        }
    }
}

impl std::fmt::Debug for Sweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper")
            .field("interval", &self.interval)
            .field("running", &self.thread_handle.is_some())
            .finish()
    }
}
