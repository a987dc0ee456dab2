//! Cuztory admin CLI - the operator console.
//!
//! # Usage
//!
//! ```bash
//! # Store the admin token once
//! cz-admin login --token "$TOKEN"
//!
//! # Orders
//! cz-admin orders list
//! cz-admin orders show 665f1c2ab1d4
//! cz-admin orders status 665f1c2ab1d4 "Out for Delivery"
//! cz-admin orders invoice 665f1c2ab1d4 --out invoices/
//! cz-admin orders message 665f1c2ab1d4 confirm
//!
//! # Shipments
//! cz-admin shipments create 665f1c2ab1d4
//! cz-admin shipments bulk 665f1c2ab1d4 665f1c2ab1d5
//!
//! # Catalog and settings
//! cz-admin collections list
//! cz-admin shipping-rates add --name Express --rate 99
//! cz-admin analytics
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` - Manage the stored admin token
//! - `orders` - List, inspect, update and delete orders
//! - `shipments` - Shiprocket shipment lifecycle
//! - `collections`, `banners`, `products` - Catalog management
//! - `shipping-rates`, `payment` - Store settings
//! - `analytics` - Dashboard summary

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cuztory_admin::{AdminConfig, AppError};

mod commands;
mod operator;
mod output;

use commands::catalog::{BannerAction, CollectionAction, ProductAction};
use commands::orders::{OrderAction, ShipmentAction};
use commands::settings::{PaymentAction, ShippingRateAction};

#[derive(Parser)]
#[command(name = "cz-admin")]
#[command(author, version, about = "Cuztory store admin console")]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an admin token for later commands
    Login {
        /// Token to store; read from stdin when omitted
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Remove the stored admin token
    Logout,
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage Shiprocket shipments
    Shipments {
        #[command(subcommand)]
        action: ShipmentAction,
    },
    /// Manage collections
    Collections {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Manage storefront banners
    Banners {
        #[command(subcommand)]
        action: BannerAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage shipping rates
    ShippingRates {
        #[command(subcommand)]
        action: ShippingRateAction,
    },
    /// View or change checkout payment options
    Payment {
        #[command(subcommand)]
        action: PaymentAction,
    },
    /// Show the dashboard summary
    Analytics,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cuztory_admin=info,cuztory_cli=info".into());

    // JSON when shipping logs somewhere, text in a terminal
    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

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

    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry first so the tracing layer has a client to report to
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        if let Some(AppError::Cancelled(reason)) = e.downcast_ref::<AppError>() {
            tracing::info!("Nothing done: {reason}");
            return;
        }
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: AdminConfig) -> Result<(), Box<dyn std::error::Error>> {
    let operator = operator::TerminalOperator::new(cli.yes);

    match cli.command {
        Commands::Login { token } => commands::session::login(&config, token)?,
        Commands::Logout => commands::session::logout(&config)?,
        Commands::Orders { action } => {
            commands::orders::run_order(&config, operator, action).await?;
        }
        Commands::Shipments { action } => {
            commands::orders::run_shipment(&config, operator, action).await?;
        }
        Commands::Collections { action } => {
            commands::catalog::run_collection(&config, operator, action).await?;
        }
        Commands::Banners { action } => {
            commands::catalog::run_banner(&config, operator, action).await?;
        }
        Commands::Products { action } => {
            commands::catalog::run_product(&config, operator, action).await?;
        }
        Commands::ShippingRates { action } => {
            commands::settings::run_shipping_rate(&config, operator, action).await?;
        }
        Commands::Payment { action } => {
            commands::settings::run_payment(&config, operator, action).await?;
        }
        Commands::Analytics => commands::settings::analytics(&config, operator).await?,
    }
    Ok(())
}
