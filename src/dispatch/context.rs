//! Handler contexts.
//!
//! A context bundles the triggering event with the shared services a
//! handler needs: the session store and the outbound sender. Contexts are
//! cheap to clone; the shared parts live behind `Arc`.

use std::sync::Arc;

use crate::error::{HandlerError, HandlerResult};
use crate::event::{CallbackEvent, MessageEvent, StartedEvent};
use crate::outbound::{CallbackAnswer, MessageSender, OutboundMessage};
use crate::session::{SessionState, SessionStore, UserId};

/// Context passed to command, fallback, and session handlers.
#[derive(Clone)]
pub struct MessageContext {
    pub event: MessageEvent,
    sessions: Arc<SessionStore>,
    sender: Arc<dyn MessageSender>,
}

impl MessageContext {
    pub fn new(
        event: MessageEvent,
        sessions: Arc<SessionStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            event,
            sessions,
            sender,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.event.user_id
    }

    /// Reply with plain text to the user who wrote.
    pub async fn reply_text(&self, text: impl Into<String>) -> HandlerResult {
        let message = OutboundMessage::text(text).to_user(self.event.user_id);
        self.sender.send(message).await?;
        Ok(())
    }

    /// Send an arbitrary outbound message.
    pub async fn send(&self, message: OutboundMessage) -> HandlerResult {
        self.sender.send(message).await?;
        Ok(())
    }

    /// Current session state for the author, if any.
    pub fn session(&self) -> Result<Option<SessionState>, HandlerError> {
        self.sessions.get(self.event.user_id).map_err(Into::into)
    }

    /// Replace the author's session state.
    pub fn set_session(&self, state: SessionState) -> HandlerResult {
        self.sessions.set(self.event.user_id, state)?;
        Ok(())
    }

    /// Drop the author's session state.
    pub fn clear_session(&self) -> HandlerResult {
        self.sessions.clear(self.event.user_id)?;
        Ok(())
    }
}

/// Context passed to callback handlers.
#[derive(Clone)]
pub struct CallbackContext {
    pub event: CallbackEvent,
    sessions: Arc<SessionStore>,
    sender: Arc<dyn MessageSender>,
}

impl CallbackContext {
    pub fn new(
        event: CallbackEvent,
        sessions: Arc<SessionStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            event,
            sessions,
            sender,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.event.user_id
    }

    /// Answer the callback, releasing the client's waiting state.
    pub async fn answer(&self, answer: CallbackAnswer) -> HandlerResult {
        self.sender
            .answer_callback(&self.event.callback_id, answer)
            .await?;
        Ok(())
    }

    /// Reply with plain text to the user who pressed the button.
    pub async fn reply_text(&self, text: impl Into<String>) -> HandlerResult {
        let message = OutboundMessage::text(text).to_user(self.event.user_id);
        self.sender.send(message).await?;
        Ok(())
    }

    /// Send an arbitrary outbound message.
    pub async fn send(&self, message: OutboundMessage) -> HandlerResult {
        self.sender.send(message).await?;
        Ok(())
    }

    pub fn session(&self) -> Result<Option<SessionState>, HandlerError> {
        self.sessions.get(self.event.user_id).map_err(Into::into)
    }

    pub fn set_session(&self, state: SessionState) -> HandlerResult {
        self.sessions.set(self.event.user_id, state)?;
        Ok(())
    }

    pub fn clear_session(&self) -> HandlerResult {
        self.sessions.clear(self.event.user_id)?;
        Ok(())
    }
}

/// Context passed to "conversation started" handlers.
#[derive(Clone)]
pub struct StartedContext {
    pub event: StartedEvent,
    sender: Arc<dyn MessageSender>,
}

impl StartedContext {
    pub fn new(event: StartedEvent, sender: Arc<dyn MessageSender>) -> Self {
        Self { event, sender }
    }

    pub fn user_id(&self) -> UserId {
        self.event.user_id
    }

    /// Greet the user who just opened the conversation.
    pub async fn reply_text(&self, text: impl Into<String>) -> HandlerResult {
        let message = OutboundMessage::text(text).to_user(self.event.user_id);
        self.sender.send(message).await?;
        Ok(())
    }

    /// Send an arbitrary outbound message.
    pub async fn send(&self, message: OutboundMessage) -> HandlerResult {
        self.sender.send(message).await?;
        Ok(())
    }
}
