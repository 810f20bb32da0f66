//! Module supervision.
//!
//! The process is a set of long-running modules (dispatcher, HTTP
//! listener) started together and stopped together. The supervisor runs
//! each module on its own task, waits for the first failure or an outside
//! shutdown request, and then cancels the rest before returning.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::BotError;
use crate::Result;

/// A long-running unit of the process.
///
/// `run` owns its loop until it finishes naturally or the token fires.
/// Returning [`BotError::Cancelled`] after a shutdown request counts as a
/// clean stop, not a failure.
#[async_trait]
pub trait Module: Send + Sync {
    async fn run(&self, shutdown: CancellationToken) -> Result<()>;
}

struct Entry {
    name: String,
    module: Box<dyn Module>,
}

/// Starts registered modules and escalates the first genuine failure.
#[derive(Default)]
pub struct Supervisor {
    modules: Vec<Entry>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under a name used in logs and error reports.
    pub fn register(&mut self, name: impl Into<String>, module: Box<dyn Module>) {
        self.modules.push(Entry {
            name: name.into(),
            module,
        });
    }

    /// Run every registered module until one fails, all finish, or the
    /// given token is cancelled.
    ///
    /// On the first failure the remaining modules are cancelled and the
    /// failure is returned wrapped with the module's name. Outside
    /// cancellation yields [`BotError::Cancelled`]; all modules finishing
    /// cleanly yields `Ok(())`.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        if self.modules.is_empty() {
            return Err(BotError::NoModules);
        }

        // Each module gets a child token so the supervisor can stop the
        // survivors without cancelling the caller's token.
        let child = shutdown.child_token();

        // Sized to hold one error per module so a failing module is never
        // blocked on a supervisor that has already moved on.
        let (err_tx, mut err_rx) = mpsc::channel::<(String, BotError)>(self.modules.len());

        let mut handles = Vec::with_capacity(self.modules.len());
        for entry in self.modules {
            let token = child.clone();
            let err_tx = err_tx.clone();
            handles.push(tokio::spawn(async move {
                info!(module = %entry.name, "module started");
                match entry.module.run(token).await {
                    Ok(()) => info!(module = %entry.name, "module stopped"),
                    Err(err) if err.is_cancellation() => {
                        info!(module = %entry.name, "module stopped")
                    }
                    Err(err) => {
                        let _ = err_tx.send((entry.name, err)).await;
                    }
                }
            }));
        }
        drop(err_tx);

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let drain = tokio::spawn(async move {
            for handle in handles {
                if let Err(err) = handle.await {
                    error!(error = %err, "module task panicked");
                }
            }
            let _ = done_tx.send(());
        });

        let outcome = tokio::select! {
            failed = err_rx.recv() => match failed {
                Some((name, err)) => Err(BotError::Module {
                    name,
                    source: Box::new(err),
                }),
                // All senders gone without a report: every module is done.
                None => Ok(()),
            },
            _ = shutdown.cancelled() => Err(BotError::Cancelled),
            _ = done_rx => Ok(()),
        };

        // Stop the survivors and wait for them before returning, so no
        // module task outlives the supervisor.
        child.cancel();
        let _ = drain.await;
        outcome
    }
}
