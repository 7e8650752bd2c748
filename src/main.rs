//! Support Flow server and token tool.

use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use support_flow::adapters::http::{app_router, TurnHandlers};
use support_flow::adapters::{
    CatalogStore, HttpOrderQueryService, LoggingNotifier, MockSemanticClassifier,
    OpenAiClassifierConfig, OpenAiSemanticClassifier, TelegramNotifier,
};
use support_flow::application::{ProcessTurnHandler, ReloadCatalogHandler};
use support_flow::config::AppConfig;
use support_flow::domain::auth::{TokenVerifier, DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MAX_AGE_SECS};
use support_flow::domain::foundation::UserId;
use support_flow::ports::{ImageNotifier, SemanticClassifier};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "support-flow")]
#[command(about = "Multi-turn customer support workflow engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Issue a credential token for a user
    Token {
        user_id: String,
        /// Unix timestamp to sign (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
        #[arg(long, env = "SUPPORT_FLOW__AUTH__SECRET_KEY", hide_env_values = true)]
        secret: String,
    },

    /// Check a credential token against a user
    Verify {
        user_id: String,
        token: String,
        #[arg(long, env = "SUPPORT_FLOW__AUTH__SECRET_KEY", hide_env_values = true)]
        secret: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Token {
            user_id,
            timestamp,
            secret,
        } => {
            let verifier = TokenVerifier::new(secret, DEFAULT_MAX_AGE_SECS, DEFAULT_CLOCK_SKEW_SECS);
            let token = verifier.generate(&user_id, timestamp.unwrap_or_else(|| Utc::now().timestamp()))?;
            println!("{}", token);
            Ok(())
        }
        Commands::Verify {
            user_id,
            token,
            secret,
        } => {
            let verifier = TokenVerifier::new(secret, DEFAULT_MAX_AGE_SECS, DEFAULT_CLOCK_SKEW_SECS);
            let user = UserId::new(user_id)?;
            match verifier.verify(Some(&token), &user, Utc::now().timestamp()) {
                Ok(()) => {
                    println!("valid");
                    Ok(())
                }
                Err(e) => {
                    println!("invalid: {}", e.reason());
                    Err(e.into())
                }
            }
        }
    }
}

async fn serve() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting support-flow"
    );

    let catalog = Arc::new(CatalogStore::load(&config.workflow.catalog_path)?);

    let semantic: Arc<dyn SemanticClassifier> = match &config.classifier.api_key {
        Some(key) if config.classifier.is_configured() => {
            let classifier_config = OpenAiClassifierConfig::new(key.clone())
                .with_base_url(config.classifier.base_url.clone())
                .with_model(config.classifier.model.clone())
                .with_timeout(config.classifier.timeout());
            Arc::new(OpenAiSemanticClassifier::new(classifier_config)?)
        }
        _ => {
            tracing::warn!("No classifier API key; unmatched messages go straight to a human");
            Arc::new(MockSemanticClassifier::new())
        }
    };

    let queries = Arc::new(HttpOrderQueryService::new(
        config.backend.base_url.clone(),
        config.backend.site,
        config.backend.timeout(),
    )?);

    let notifier: Arc<dyn ImageNotifier> = match config.notifier.telegram() {
        Some((token, chat_id)) => Arc::new(TelegramNotifier::new(token, chat_id)?),
        None => {
            tracing::warn!("Telegram not configured; images will only be logged");
            Arc::new(LoggingNotifier)
        }
    };

    let verifier = TokenVerifier::new(
        config.auth.secret_key.clone(),
        config.auth.max_age_secs,
        config.auth.clock_skew_secs,
    );

    let process = ProcessTurnHandler::new(
        catalog.clone(),
        semantic,
        queries,
        notifier,
        verifier,
        config.auth.anonymous_policy,
    );
    let handlers = TurnHandlers::new(Arc::new(process), Arc::new(ReloadCatalogHandler::new(catalog)));
    let app = app_router(handlers, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).pretty().init();
    }
}
