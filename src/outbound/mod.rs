//! Outbound messaging and inbound update transport boundaries.
//!
//! The dispatcher consumes an [`UpdateSource`] and handlers reply through a
//! [`MessageSender`]; both are dyn traits so the core stays independent of
//! any particular messenger API.

mod channel;
mod http;
mod message;

pub use channel::ChannelUpdateSource;
pub use http::HttpMessageSender;
pub use message::{CallbackAnswer, Keyboard, KeyboardButton, OutboundMessage};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::event::Event;
use crate::Result;

/// Failure to deliver an outbound message or callback answer.
#[derive(Error, Debug)]
pub enum SendError {
    /// Delivery was interrupted by shutdown.
    #[error("send cancelled")]
    Cancelled,

    /// The platform rejected the request.
    #[error("platform returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure (connection, TLS, serialization).
    #[error("transport: {0}")]
    Transport(String),
}

impl SendError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SendError::Cancelled)
    }
}

/// Identifier the platform assigns to a delivered message.
pub type DeliveryId = String;

/// Source of inbound updates (long polling, webhook ingestion, or a test
/// channel).
///
/// The stream must close when exhausted. A closed stream without a pending
/// cancellation is a clean shutdown; with one, it is the cancellation.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Hand out the event stream. Called exactly once by the dispatcher.
    async fn get_updates(&self, shutdown: CancellationToken) -> Result<mpsc::Receiver<Event>>;
}

/// Outbound side of the messaging channel.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver a message and return the platform's delivery identifier.
    async fn send(&self, message: OutboundMessage) -> std::result::Result<DeliveryId, SendError>;

    /// Answer a callback so the client stops showing a spinner. An empty
    /// answer is still delivered; it just closes the waiting state.
    async fn answer_callback(
        &self,
        callback_id: &str,
        answer: CallbackAnswer,
    ) -> std::result::Result<(), SendError>;
}
