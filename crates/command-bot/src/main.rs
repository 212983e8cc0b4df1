//! Command bot - main entry point.

use anyhow::Context;
use command_bot::config::Config;
use command_bot::install::{provision_secret, BotInstallation};
use command_bot::server::{create_router, AppState};
use command_bot::{AppResult, CommandEngine};
use command_store::{CommandRegistry, CommandStore};
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::sync::Arc;
use talk_client::TalkClient;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting command bot...");

    // Initialize storage
    let store = if config.store.persist {
        CommandStore::open(&config.store.path).await?
    } else {
        info!("Persistence disabled, using in-memory storage");
        CommandStore::memory()
    };
    info!("Command store ready with {} commands", store.command_count().await);

    // Shared secret and installation instructions
    let installation =
        BotInstallation::new(&config.bot.name, &config.bot.url, &config.bot.description);
    let (secret, secret_expression) = match config.bot.secret {
        Some(secret) => (secret, "\"$BOT__SECRET\"".to_string()),
        None => (
            provision_secret(&config.bot.secret_path).await?,
            format!("\"$(cat {})\"", config.bot.secret_path.display()),
        ),
    };
    info!(
        "Install the bot on {} with: {}",
        config.talk.backend_url,
        installation.occ_command(&secret_expression)
    );

    let talk_secret = SecretString::new(secret.expose_secret().clone());
    let talk = TalkClient::new(&config.talk.backend_url, talk_secret, config.talk.timeout)?;

    if talk.health_check().await {
        info!("Talk server healthy at {}", talk.base_url());
    } else {
        warn!(
            "Talk server not reachable at {} - replies will fail until it is",
            config.talk.backend_url
        );
    }

    let registry: Arc<dyn CommandRegistry> = Arc::new(store);
    let engine = CommandEngine::new(registry);
    info!("Registered {} command handlers", engine.handler_count());

    let state = AppState::new(engine, talk, secret, &config.talk.backend_url);
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .context("Invalid listen address")?,
        config.server.port,
    );
    let listener = TcpListener::bind(addr).await?;
    info!("Listening for webhooks on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Shutting down...");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
