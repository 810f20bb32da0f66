//! Error types for campus-bot.

use thiserror::Error;

/// Main error type for campus-bot operations.
///
/// Module-level failures escalate to the supervisor through this type;
/// per-event handler failures use [`HandlerError`] and never unwind past
/// the dispatcher's event loop.
#[derive(Error, Debug)]
pub enum BotError {
    /// Shutdown was requested. This is the expected teardown path and is
    /// never reported as a process failure.
    #[error("operation cancelled")]
    Cancelled,

    /// The supervisor was started with an empty module set.
    #[error("no modules registered")]
    NoModules,

    /// A supervised module stopped with an error.
    #[error("module {name}: {source}")]
    Module {
        name: String,
        #[source]
        source: Box<BotError>,
    },

    /// The update source handed out its stream already, or is unusable.
    #[error("update source: {0}")]
    UpdateSource(String),

    /// Outbound delivery failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Configuration could not be loaded or validated.
    #[error("config: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl BotError {
    /// Whether this error represents a requested shutdown rather than a
    /// genuine failure.
    pub fn is_cancellation(&self) -> bool {
        match self {
            BotError::Cancelled => true,
            BotError::Module { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}

/// Error produced while handling a single inbound event.
///
/// `Ok(())` from a handler is the explicit "nothing to report" outcome;
/// there is no empty-message error that doubles as success.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler observed a shutdown request mid-flight.
    #[error("operation cancelled")]
    Cancelled,

    /// A reply or notification could not be delivered.
    #[error("send failed: {0}")]
    Send(String),

    /// A backend collaborator call failed.
    #[error(transparent)]
    Backend(#[from] crate::backend::BackendError),

    /// The stored session payload could not be restored.
    #[error(transparent)]
    Wizard(#[from] crate::wizard::WizardError),

    /// Session store access failed.
    #[error("session store: {0}")]
    Store(String),

    /// Anything else a handler wants to surface.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Whether this failure is a shutdown request in disguise. Such errors
    /// stop the dispatch loop instead of being logged and skipped.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, HandlerError::Cancelled)
    }
}

impl From<crate::outbound::SendError> for HandlerError {
    fn from(err: crate::outbound::SendError) -> Self {
        if err.is_cancellation() {
            HandlerError::Cancelled
        } else {
            HandlerError::Send(err.to_string())
        }
    }
}

impl From<BotError> for HandlerError {
    fn from(err: BotError) -> Self {
        match err {
            BotError::Cancelled => HandlerError::Cancelled,
            BotError::LockPoisoned => HandlerError::Store("lock poisoned".into()),
            other => HandlerError::Other(other.to_string()),
        }
    }
}

/// Convenience Result type for campus-bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

/// Result type returned by every event handler.
pub type HandlerResult = std::result::Result<(), HandlerError>;
