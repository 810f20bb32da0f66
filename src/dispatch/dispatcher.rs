//! The event loop.
//!
//! The dispatcher drains the update stream and routes every event to one
//! handler chain. Handler failures are logged and the loop keeps going; a
//! single bad update or flaky backend call must never stop the bot. Only a
//! shutdown request ends the loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::context::{CallbackContext, MessageContext, StartedContext};
use super::registry::HandlerRegistry;
use crate::error::{BotError, HandlerError};
use crate::event::{CallbackEvent, Event, MessageEvent, StartedEvent};
use crate::outbound::{CallbackAnswer, MessageSender, UpdateSource};
use crate::session::SessionStore;
use crate::supervisor::Module;
use crate::Result;

/// Routes inbound events to registered handlers.
///
/// Message routing priority: an active session's step handler wins over a
/// command, a command wins over the fallback chain. Exactly one of the
/// three runs for any message.
pub struct Dispatcher {
    source: Arc<dyn UpdateSource>,
    sender: Arc<dyn MessageSender>,
    sessions: Arc<SessionStore>,
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        sender: Arc<dyn MessageSender>,
        sessions: Arc<SessionStore>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            source,
            sender,
            sessions,
            registry,
        }
    }

    async fn process(&self, event: Event) -> std::result::Result<(), HandlerError> {
        match event {
            Event::Message(message) => self.handle_message(message).await,
            Event::Callback(callback) => self.handle_callback(callback).await,
            Event::ConversationStarted(started) => self.handle_started(started).await,
            Event::Unrecognized { kind } => {
                debug!(kind = %kind, "dropping unrecognized update");
                Ok(())
            }
        }
    }

    async fn handle_message(&self, event: MessageEvent) -> std::result::Result<(), HandlerError> {
        info!(
            user_id = event.user_id,
            chat_id = event.chat_id,
            "incoming message"
        );

        let ctx = MessageContext::new(event, self.sessions.clone(), self.sender.clone());

        // An active session owns the dialog. Even a slash command goes to
        // the step handler; leaving the flow is the handler's decision.
        if let Some(state) = ctx.session()? {
            if let Some(handler) = self.registry.session_handler(&state.step) {
                return handler(ctx, state).await;
            }
            debug!(step = %state.step, "no handler owns this session step");
        }

        if let Some(command) = ctx.event.command() {
            if let Some(entry) = self.registry.command(&command) {
                info!(command = %command, user_id = ctx.user_id(), "running command");
                return (entry.handler)(ctx).await;
            }
        }

        for handler in self.registry.message_handlers() {
            handler(ctx.clone()).await?;
        }
        Ok(())
    }

    async fn handle_callback(&self, event: CallbackEvent) -> std::result::Result<(), HandlerError> {
        info!(
            user_id = event.user_id,
            payload = %event.payload,
            "incoming callback"
        );

        let ctx = CallbackContext::new(event, self.sessions.clone(), self.sender.clone());

        // The client shows a spinner until the callback is answered, so a
        // callback nobody handles still gets an empty answer to release it.
        // A failed handler gets a short toast instead of silence.
        if self.registry.callback_handlers().is_empty() {
            return ctx.answer(CallbackAnswer::none()).await;
        }

        for handler in self.registry.callback_handlers() {
            if let Err(err) = handler(ctx.clone()).await {
                if err.is_cancellation() {
                    return Err(err);
                }
                let _ = ctx
                    .answer(CallbackAnswer::notify(
                        "Temporarily unavailable. Please try again later.",
                    ))
                    .await;
                return Err(err);
            }
        }
        Ok(())
    }

    async fn handle_started(&self, event: StartedEvent) -> std::result::Result<(), HandlerError> {
        info!(user_id = event.user_id, "conversation started");

        let ctx = StartedContext::new(event, self.sender.clone());
        for handler in self.registry.started_handlers() {
            handler(ctx.clone()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Module for Dispatcher {
    async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let mut updates = self.source.get_updates(shutdown.clone()).await?;

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => return Err(BotError::Cancelled),
                event = updates.recv() => match event {
                    Some(event) => event,
                    // Stream closed: clean end of input unless we were
                    // asked to stop.
                    None => {
                        if shutdown.is_cancelled() {
                            return Err(BotError::Cancelled);
                        }
                        return Ok(());
                    }
                },
            };

            let kind = event.kind().to_string();
            if let Err(err) = self.process(event).await {
                if err.is_cancellation() {
                    return Err(BotError::Cancelled);
                }
                error!(kind = %kind, error = %err, "event handling failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::HandlerRegistry;
    use crate::outbound::{ChannelUpdateSource, DeliveryId, OutboundMessage, SendError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        messages: Mutex<Vec<OutboundMessage>>,
        answers: Mutex<Vec<(String, CallbackAnswer)>>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(
            &self,
            message: OutboundMessage,
        ) -> std::result::Result<DeliveryId, SendError> {
            self.messages.lock().unwrap().push(message);
            Ok("mid-1".into())
        }

        async fn answer_callback(
            &self,
            callback_id: &str,
            answer: CallbackAnswer,
        ) -> std::result::Result<(), SendError> {
            self.answers
                .lock()
                .unwrap()
                .push((callback_id.to_string(), answer));
            Ok(())
        }
    }

    fn dispatcher_with(
        registry: HandlerRegistry,
    ) -> (
        Dispatcher,
        tokio::sync::mpsc::Sender<Event>,
        Arc<RecordingSender>,
    ) {
        let (source, tx) = ChannelUpdateSource::new(16);
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Dispatcher::new(
            Arc::new(source),
            sender.clone(),
            Arc::new(SessionStore::new()),
            Arc::new(registry),
        );
        (dispatcher, tx, sender)
    }

    #[tokio::test]
    async fn test_command_routes_and_fallback_skipped() {
        let registry = HandlerRegistry::builder()
            .command("start", "greet", |ctx| async move {
                ctx.reply_text("hello").await
            })
            .message_handler(|ctx| async move { ctx.reply_text("fallback").await })
            .build();
        let (dispatcher, tx, sender) = dispatcher_with(registry);

        tx.send(Event::Message(MessageEvent {
            user_id: 7,
            text: "/start".into(),
            ..Default::default()
        }))
        .await
        .unwrap();
        drop(tx);

        dispatcher.run(CancellationToken::new()).await.unwrap();

        let messages = sender.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello");
    }

    #[tokio::test]
    async fn test_active_session_wins_over_command() {
        let registry = HandlerRegistry::builder()
            .command("start", "greet", |ctx| async move {
                ctx.reply_text("command").await
            })
            .session_handler("wizard", |ctx, state| async move {
                ctx.reply_text(format!("session at {}", state.step)).await
            })
            .build();
        let (dispatcher, tx, sender) = dispatcher_with(registry);

        dispatcher
            .sessions
            .set(7, crate::session::SessionState::at_step("wizard"))
            .unwrap();

        tx.send(Event::Message(MessageEvent {
            user_id: 7,
            text: "/start".into(),
            ..Default::default()
        }))
        .await
        .unwrap();
        drop(tx);

        dispatcher.run(CancellationToken::new()).await.unwrap();

        let messages = sender.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "session at wizard");
    }

    #[tokio::test]
    async fn test_unhandled_callback_still_answered() {
        let (dispatcher, tx, sender) = dispatcher_with(HandlerRegistry::builder().build());

        tx.send(Event::Callback(CallbackEvent {
            callback_id: "cb-9".into(),
            user_id: 7,
            ..Default::default()
        }))
        .await
        .unwrap();
        drop(tx);

        dispatcher.run(CancellationToken::new()).await.unwrap();

        let answers = sender.answers.lock().unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].0, "cb-9");
        assert_eq!(answers[0].1, CallbackAnswer::none());
    }

    #[tokio::test]
    async fn test_failed_callback_answered_with_toast() {
        let registry = HandlerRegistry::builder()
            .callback_handler(|_ctx| async { Err(HandlerError::Other("backend down".into())) })
            .build();
        let (dispatcher, tx, sender) = dispatcher_with(registry);

        tx.send(Event::Callback(CallbackEvent {
            callback_id: "cb-9".into(),
            user_id: 7,
            ..Default::default()
        }))
        .await
        .unwrap();
        drop(tx);

        dispatcher.run(CancellationToken::new()).await.unwrap();

        let answers = sender.answers.lock().unwrap();
        assert_eq!(answers.len(), 1);
        let toast = answers[0].1.notification.as_deref().unwrap();
        assert!(toast.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_loop() {
        let registry = HandlerRegistry::builder()
            .command("bad", "always fails", |_ctx| async {
                Err(HandlerError::Other("boom".into()))
            })
            .command("good", "works", |ctx| async move { ctx.reply_text("ok").await })
            .build();
        let (dispatcher, tx, sender) = dispatcher_with(registry);

        for text in ["/bad", "/good"] {
            tx.send(Event::Message(MessageEvent {
                user_id: 7,
                text: text.into(),
                ..Default::default()
            }))
            .await
            .unwrap();
        }
        drop(tx);

        dispatcher.run(CancellationToken::new()).await.unwrap();

        let messages = sender.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "ok");
    }

    #[tokio::test]
    async fn test_unrecognized_event_is_dropped() {
        let (dispatcher, tx, sender) = dispatcher_with(HandlerRegistry::builder().build());

        tx.send(Event::Unrecognized {
            kind: "message_edited".into(),
        })
        .await
        .unwrap();
        drop(tx);

        dispatcher.run(CancellationToken::new()).await.unwrap();
        assert!(sender.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_stops_loop() {
        let (dispatcher, _tx, _sender) = dispatcher_with(HandlerRegistry::builder().build());

        let token = CancellationToken::new();
        token.cancel();
        let err = dispatcher.run(token).await.expect_err("must be cancelled");
        assert!(err.is_cancellation());
    }
}
