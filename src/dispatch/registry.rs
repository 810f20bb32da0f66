//! Handler registry.
//!
//! All handlers are registered at startup through [`RegistryBuilder`] and
//! frozen by [`RegistryBuilder::build`]; the dispatcher only ever sees the
//! immutable [`HandlerRegistry`], so there are no registration races to
//! guard against once the event loop is running.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use super::context::{CallbackContext, MessageContext, StartedContext};
use super::normalize_command;
use crate::error::HandlerResult;
use crate::session::SessionState;

/// Handler for a registered slash command.
pub type MessageHandler = Arc<dyn Fn(MessageContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Handler invoked while a user has an active session at a given step.
pub type SessionHandler =
    Arc<dyn Fn(MessageContext, SessionState) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Handler for inline button presses.
pub type CallbackHandler =
    Arc<dyn Fn(CallbackContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Handler for "conversation started" signals.
pub type StartedHandler =
    Arc<dyn Fn(StartedContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

pub(crate) struct CommandEntry {
    pub description: String,
    pub handler: MessageHandler,
}

/// Short description of a registered command, for `/help` style listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
}

/// Immutable collection of every handler the dispatcher can route to.
pub struct HandlerRegistry {
    command_order: Vec<String>,
    commands: HashMap<String, CommandEntry>,
    message_handlers: Vec<MessageHandler>,
    callback_handlers: Vec<CallbackHandler>,
    started_handlers: Vec<StartedHandler>,
    session_handlers: HashMap<String, SessionHandler>,
}

impl HandlerRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub(crate) fn session_handler(&self, step: &str) -> Option<&SessionHandler> {
        self.session_handlers.get(step)
    }

    pub(crate) fn message_handlers(&self) -> &[MessageHandler] {
        &self.message_handlers
    }

    pub(crate) fn callback_handlers(&self) -> &[CallbackHandler] {
        &self.callback_handlers
    }

    pub(crate) fn started_handlers(&self) -> &[StartedHandler] {
        &self.started_handlers
    }

    /// Registered commands, in registration order.
    pub fn commands(&self) -> Vec<CommandInfo> {
        self.command_order
            .iter()
            .filter_map(|name| {
                self.commands.get(name).map(|entry| CommandInfo {
                    name: name.clone(),
                    description: entry.description.clone(),
                })
            })
            .collect()
    }
}

/// Builder collecting handler registrations before the dispatcher starts.
///
/// Registrations with an empty name/step are silently ignored: they come
/// from static, code-reviewed setup, so a defensive no-op beats an error
/// path nobody would handle.
#[derive(Default)]
pub struct RegistryBuilder {
    command_order: Vec<String>,
    commands: HashMap<String, CommandEntry>,
    message_handlers: Vec<MessageHandler>,
    callback_handlers: Vec<CallbackHandler>,
    started_handlers: Vec<StartedHandler>,
    session_handlers: HashMap<String, SessionHandler>,
}

impl RegistryBuilder {
    /// Register (or replace) a slash command.
    pub fn command<H, F>(mut self, name: &str, description: &str, handler: H) -> Self
    where
        H: Fn(MessageContext) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerResult> + Send + 'static,
    {
        let name = normalize_command(name);
        if name.is_empty() {
            return self;
        }

        if !self.commands.contains_key(&name) {
            self.command_order.push(name.clone());
        }
        self.commands.insert(
            name,
            CommandEntry {
                description: description.to_string(),
                handler: Arc::new(move |ctx| Box::pin(handler(ctx))),
            },
        );
        self
    }

    /// Register a fallback handler, run when neither a session nor a
    /// command matched. Fallbacks run in registration order.
    pub fn message_handler<H, F>(mut self, handler: H) -> Self
    where
        H: Fn(MessageContext) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerResult> + Send + 'static,
    {
        self.message_handlers
            .push(Arc::new(move |ctx| Box::pin(handler(ctx))));
        self
    }

    /// Register a handler for inline button presses.
    pub fn callback_handler<H, F>(mut self, handler: H) -> Self
    where
        H: Fn(CallbackContext) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerResult> + Send + 'static,
    {
        self.callback_handlers
            .push(Arc::new(move |ctx| Box::pin(handler(ctx))));
        self
    }

    /// Register a handler for "conversation started" signals.
    pub fn started_handler<H, F>(mut self, handler: H) -> Self
    where
        H: Fn(StartedContext) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerResult> + Send + 'static,
    {
        self.started_handlers
            .push(Arc::new(move |ctx| Box::pin(handler(ctx))));
        self
    }

    /// Register the handler owning a session step.
    pub fn session_handler<H, F>(mut self, step: &str, handler: H) -> Self
    where
        H: Fn(MessageContext, SessionState) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerResult> + Send + 'static,
    {
        if step.is_empty() {
            return self;
        }
        self.session_handlers.insert(
            step.to_string(),
            Arc::new(move |ctx, state| Box::pin(handler(ctx, state))),
        );
        self
    }

    /// Freeze the registrations. No handler can be added afterwards.
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            command_order: self.command_order,
            commands: self.commands,
            message_handlers: self.message_handlers,
            callback_handlers: self.callback_handlers,
            started_handlers: self.started_handlers,
            session_handlers: self.session_handlers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_normalization_on_register() {
        let registry = HandlerRegistry::builder()
            .command(" /Start ", "open the menu", |_ctx| async { Ok(()) })
            .build();

        assert!(registry.command("start").is_some());
        assert!(registry.command("/start").is_none());
    }

    #[test]
    fn test_empty_names_ignored() {
        let registry = HandlerRegistry::builder()
            .command("", "nothing", |_ctx| async { Ok(()) })
            .session_handler("", |_ctx, _state| async { Ok(()) })
            .build();

        assert!(registry.commands().is_empty());
        assert!(registry.session_handler("").is_none());
    }

    #[test]
    fn test_commands_listed_in_registration_order() {
        let registry = HandlerRegistry::builder()
            .command("start", "open the menu", |_ctx| async { Ok(()) })
            .command("help", "list commands", |_ctx| async { Ok(()) })
            .command("start", "replaced description", |_ctx| async { Ok(()) })
            .build();

        let commands = registry.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].name, "start");
        assert_eq!(commands[0].description, "replaced description");
        assert_eq!(commands[1].name, "help");
    }

    #[test]
    fn test_session_handler_lookup() {
        let registry = HandlerRegistry::builder()
            .session_handler("form:filling", |_ctx, _state| async { Ok(()) })
            .build();

        assert!(registry.session_handler("form:filling").is_some());
        assert!(registry.session_handler("other").is_none());
    }
}
