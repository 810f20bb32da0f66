//! # campus-bot
//!
//! University assistant bot runtime: a supervised event dispatcher, a
//! per-user session store, and a generic wizard engine, with the campus
//! flows (registration, application forms, schedule, payments) wired on
//! top.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use campus_bot::{
//!     ChannelUpdateSource, Dispatcher, HandlerRegistry, Repository, Services, SessionStore,
//!     Supervisor,
//! };
//! use campus_bot::app::register_default_handlers;
//! use campus_bot::outbound::HttpMessageSender;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> campus_bot::Result<()> {
//!     campus_bot::logging::try_init("info").ok();
//!
//!     let sender = Arc::new(HttpMessageSender::new("https://botapi.max.ru", "token")?);
//!     let services = Services::new(Repository::in_memory());
//!     let registry =
//!         register_default_handlers(HandlerRegistry::builder(), services).build();
//!
//!     let (source, _updates) = ChannelUpdateSource::new(64);
//!     let dispatcher = Dispatcher::new(
//!         Arc::new(source),
//!         sender,
//!         Arc::new(SessionStore::new()),
//!         Arc::new(registry),
//!     );
//!
//!     let mut supervisor = Supervisor::new();
//!     supervisor.register("dispatcher", Box::new(dispatcher));
//!     supervisor.run(CancellationToken::new()).await
//! }
//! ```

pub mod api;
pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod logging;
pub mod outbound;
pub mod session;
pub mod supervisor;
pub mod wizard;

// Re-export commonly used types
pub use api::{AppState, HttpListener, ListenerConfig};
pub use app::{Notifier, Services};
pub use backend::Repository;
pub use config::Config;
pub use dispatch::{Dispatcher, HandlerRegistry, RegistryBuilder};
pub use error::{BotError, HandlerError, HandlerResult, Result};
pub use event::Event;
pub use outbound::{ChannelUpdateSource, MessageSender, OutboundMessage, UpdateSource};
pub use session::{SessionState, SessionStore, UserId};
pub use supervisor::{Module, Supervisor};
pub use wizard::{WizardDefinition, WizardProgress};
