//! Campus-bot binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use campus_bot::app::{register_default_handlers, Notifier, Services};
use campus_bot::api::{AppState, HttpListener, ListenerConfig};
use campus_bot::outbound::HttpMessageSender;
use campus_bot::{
    cli, logging, ChannelUpdateSource, Config, Dispatcher, HandlerRegistry, Repository,
    SessionStore, Supervisor,
};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("campus-bot: {err}");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("campus-bot: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = config.validate() {
        eprintln!("campus-bot: {err}");
        return ExitCode::FAILURE;
    }

    logging::init(config.log_filter());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run(config: Config) -> campus_bot::Result<()> {
    info!("campus-bot v{}", env!("CARGO_PKG_VERSION"));

    let sender = Arc::new(HttpMessageSender::new(
        config.bot.api_base.clone(),
        config.bot.token.clone(),
    )?);

    let repo = Repository::in_memory();
    let services = Services::new(repo.clone());
    let registry = register_default_handlers(HandlerRegistry::builder(), services).build();

    let (source, updates) = ChannelUpdateSource::new(64);
    let dispatcher = Dispatcher::new(
        Arc::new(source),
        sender.clone(),
        Arc::new(SessionStore::new()),
        Arc::new(registry),
    );

    let notifier = Arc::new(Notifier::new(sender, repo.payments.clone()));
    let listener = HttpListener::new(
        ListenerConfig::new(config.http.host.clone(), config.http.port),
        AppState::new(updates, notifier, config.http.auth_token.clone()),
    );

    let mut supervisor = Supervisor::new();
    supervisor.register("dispatcher", Box::new(dispatcher));
    supervisor.register("http", Box::new(listener));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_token.cancel();
        }
    });

    match supervisor.run(shutdown).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_cancellation() => {
            info!("campus-bot stopped");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
