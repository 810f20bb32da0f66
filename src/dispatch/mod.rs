//! Event dispatch: handler registry, handler contexts, and the dispatcher
//! loop that routes every inbound event to exactly one handler chain.

mod context;
mod dispatcher;
mod registry;

pub use context::{CallbackContext, MessageContext, StartedContext};
pub use dispatcher::Dispatcher;
pub use registry::{
    CallbackHandler, CommandInfo, HandlerRegistry, MessageHandler, RegistryBuilder, SessionHandler,
    StartedHandler,
};

/// Normalize a command name: trim whitespace, strip the leading slash,
/// lower-case.
pub fn normalize_command(name: &str) -> String {
    name.trim().trim_start_matches('/').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_command() {
        assert_eq!(normalize_command(""), "");
        assert_eq!(normalize_command("   /Ping  "), "ping");
        assert_eq!(normalize_command("help"), "help");
        assert_eq!(normalize_command("/START"), "start");
    }
}
