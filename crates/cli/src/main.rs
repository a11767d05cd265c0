//! Glossy CLI - the Glossy Beauty cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! glossy products --label nuevo
//!
//! # Fill the cart
//! glossy add --product 1 --variant 10 --quantity 3
//! glossy update --product 1 --variant 10 --delta -1
//! glossy show
//!
//! # Export a proforma
//! glossy proforma --out exports/
//!
//! # Follow changes made from other terminals
//! glossy watch
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart and its totals
//! - `add` / `update` / `remove` / `clear` - Change the cart
//! - `proforma` - Export the cart as an HTML proforma
//! - `watch` - Reprint the cart whenever another process changes it
//! - `products` - List catalog products
//! - `categories` - List catalog categories, or one category's products
//!
//! The cart is persisted under `GLOSSY_CART_DIR`, so every invocation (and
//! every terminal) works on the same cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use glossy_cart::LineKey;
use glossy_core::{CategoryId, ProductId, VariantId};
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod commands;
mod config;

use catalog::{CatalogClient, ProductFilter};
use commands::cart::ProductSource;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "glossy")]
#[command(author, version, about = "Glossy Beauty cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart and its totals
    Show,
    /// Add units of a product variant
    Add {
        /// Product ID to look up in the catalog API
        #[arg(short, long, conflicts_with = "product_file", required_unless_present = "product_file")]
        product: Option<ProductId>,

        /// Read the product from a JSON file instead of the catalog API
        #[arg(long)]
        product_file: Option<PathBuf>,

        /// Variant ID
        #[arg(short, long)]
        variant: VariantId,

        /// Units to add
        #[arg(short, long, default_value = "1")]
        quantity: NonZeroU32,
    },
    /// Change a line's quantity by a signed amount
    Update {
        #[command(flatten)]
        line: LineArgs,

        /// Amount to add (negative to subtract)
        #[arg(short, long, allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a line
    Remove {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Empty the cart
    Clear,
    /// Export the cart as a proforma document
    Proforma {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Follow the cart and print it whenever it changes
    Watch,
    /// List catalog products
    Products {
        /// Only products with this label
        #[arg(long, group = "filter")]
        label: Option<String>,

        /// Only products in this category
        #[arg(long, group = "filter")]
        category: Option<CategoryId>,

        /// Free-text search
        #[arg(long, group = "filter")]
        search: Option<String>,
    },
    /// List catalog categories
    Categories {
        /// Show this category and its products instead
        #[arg(long)]
        id: Option<CategoryId>,
    },
}

#[derive(Args)]
struct LineArgs {
    /// Product ID
    #[arg(short, long)]
    product: ProductId,

    /// Variant ID
    #[arg(short, long)]
    variant: VariantId,
}

impl LineArgs {
    const fn key(&self) -> LineKey {
        LineKey::new(self.product, self.variant)
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.expose_secret(),
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
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "glossy_cart=info,glossy=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = CliConfig::from_env();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show => commands::cart::show(&config),
        Commands::Add {
            product,
            product_file,
            variant,
            quantity,
        } => {
            let source = match (product, product_file) {
                (_, Some(path)) => ProductSource::File(path),
                (Some(id), None) => ProductSource::Catalog(id),
                (None, None) => return Err("either --product or --product-file is required".into()),
            };
            let catalog = CatalogClient::new(config.api_url.clone())?;
            commands::cart::add(&config, &catalog, source, variant, quantity).await?;
        }
        Commands::Update { line, delta } => {
            commands::cart::update(&config, line.key(), delta);
        }
        Commands::Remove { line } => {
            commands::cart::remove(&config, line.key());
        }
        Commands::Clear => commands::cart::clear(&config),
        Commands::Proforma { out } => {
            commands::proforma::export(&config, &out)?;
        }
        Commands::Watch => commands::cart::watch(&config).await,
        Commands::Products {
            label,
            category,
            search,
        } => {
            let filter = match (label, category, search) {
                (Some(label), _, _) => ProductFilter::Label(label),
                (_, Some(category), _) => ProductFilter::Category(category),
                (_, _, Some(term)) => ProductFilter::Search(term),
                _ => ProductFilter::All,
            };
            let catalog = CatalogClient::new(config.api_url.clone())?;
            commands::products::list(&catalog, &config.cart, filter).await?;
        }
        Commands::Categories { id } => {
            let catalog = CatalogClient::new(config.api_url.clone())?;
            match id {
                Some(id) => commands::products::category(&catalog, &config.cart, id).await?,
                None => commands::products::categories(&catalog).await?,
            };
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_delta() {
        let cli = Cli::try_parse_from(["glossy", "update", "-p", "1", "-v", "10", "-d", "-2"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Update { delta: -2, .. })
        ));
    }

    #[test]
    fn test_add_requires_a_product_source() {
        assert!(Cli::try_parse_from(["glossy", "add", "-v", "10"]).is_err());
        assert!(Cli::try_parse_from(["glossy", "add", "-q", "0", "-p", "1", "-v", "10"]).is_err());
    }

    #[test]
    fn test_categories_takes_optional_id() {
        assert!(matches!(
            Cli::try_parse_from(["glossy", "categories"]).map(|c| c.command),
            Ok(Commands::Categories { id: None })
        ));
        assert!(matches!(
            Cli::try_parse_from(["glossy", "categories", "--id", "3"]).map(|c| c.command),
            Ok(Commands::Categories { id: Some(id) }) if id == CategoryId::new(3)
        ));
    }

    #[test]
    fn test_products_filters_are_exclusive() {
        assert!(
            Cli::try_parse_from(["glossy", "products", "--label", "nuevo", "--search", "x"])
                .is_err()
        );
    }
}
