//! Corner Shop CLI - Database migrations and store management.
//!
//! # Usage
//!
//! ```bash
//! # Create or update the schema
//! cs-cli migrate
//!
//! # Load the default catalog into an empty store
//! cs-cli seed
//!
//! # List the catalog
//! cs-cli products --in-stock
//!
//! # Register a customer
//! cs-cli customer register -n "Ana Lima" -e ana@example.com -p "s3cret-pass"
//!
//! # Structured logs for a log collector
//! cs-cli --log-json seed
//! ```
//!
//! All commands read `STORE_DATABASE_URL` (or `DATABASE_URL`) from the
//! environment or a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corner_shop_storefront::{StoreConfig, Storefront};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(author, version, about = "Corner Shop CLI tools")]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert the default catalog if the store has no products
    Seed,
    /// List catalog products
    Products {
        /// Only show products with stock left
        #[arg(long)]
        in_stock: bool,
    },
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Register a new customer
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Contact phone
        #[arg(long, default_value = "")]
        phone: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StoreConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(log_json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corner_shop_storefront=info,corner_shop_cli=info".into());

    let json_layer = log_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = StoreConfig::from_env();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing(cli.log_json);

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CommandError::Config(e)),
    };

    if let Err(e) = result {
        sentry::capture_error(&e);
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StoreConfig) -> Result<(), CommandError> {
    let store = Storefront::connect(config).await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&store).await?,
        Commands::Seed => commands::seed::run(&store).await?,
        Commands::Products { in_stock } => commands::catalog::list(&store, in_stock).await?,
        Commands::Customer { action } => match action {
            CustomerAction::Register {
                name,
                email,
                password,
                phone,
            } => {
                commands::customer::register(&store, &name, &email, &password, &phone).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_json_flag_is_global() {
        let cli = Cli::try_parse_from(["cs-cli", "seed", "--log-json"]).unwrap();
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Seed));

        let cli = Cli::try_parse_from(["cs-cli", "products", "--in-stock"]).unwrap();
        assert!(!cli.log_json);
        assert!(matches!(cli.command, Commands::Products { in_stock: true }));
    }
}
