//! # GoMarket Cart CLI
//!
//! Runs one cart operation against the on-disk cart and prints the result.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  args ──▶ CartConfig::load ──▶ Database::new ──▶ CartProvider::mount    │
//! │                                                        │                │
//! │                                                  ready().await          │
//! │                                                        │                │
//! │  stdout ◀── pretty JSON ◀── command (list/totals/add/...) ◀┘            │
//! │                                                                         │
//! │  unmount ──▶ db.close                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr so stdout stays machine-readable.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gomarket_cart::{CartConfig, CartHandle, CartProvider};
use gomarket_core::NewCartItem;
use gomarket_storage::{CartPersistence, Database};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gomarket-cart", version, about = "Inspect and edit the GoMarket shopping cart")]
struct Cli {
    /// Config file (defaults to gomarket.toml in the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print the cart lines
    List,
    /// Print line count, total quantity and subtotal
    Totals,
    /// Add a product, or bump its quantity if already in the cart
    Add {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        image_url: String,
        #[arg(long)]
        price: f64,
    },
    /// Raise the quantity of a line by one
    Increment { id: String },
    /// Lower the quantity of a line by one, removing it at zero
    Decrement { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = CartConfig::load(cli.config)?;
    if let Some(db) = cli.db {
        config.storage.database_path = db;
    }

    let db = Database::new(config.db_config()).await?;
    let persistence = CartPersistence::with_key(
        Arc::new(db.key_value_store()),
        config.storage.key.clone(),
    );

    let provider = CartProvider::mount(persistence, &config.service);
    provider.ready().await?;

    let context = provider.context();
    let outcome = run(context.cart()?, cli.cmd).await;

    provider.unmount().await;
    db.close().await;

    let output = outcome?;
    println!("{output}");
    Ok(())
}

/// Executes one command and renders its result.
async fn run(cart: &CartHandle, cmd: Command) -> Result<String, Box<dyn std::error::Error>> {
    let output = match cmd {
        Command::List => serde_json::to_string_pretty(&*cart.products())?,
        Command::Totals => serde_json::to_string_pretty(&cart.totals())?,
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let updated = cart
                .add_to_cart(NewCartItem::new(id, title, image_url, price))
                .await?;
            serde_json::to_string_pretty(&*updated)?
        }
        Command::Increment { id } => serde_json::to_string_pretty(&*cart.increment(id).await?)?,
        Command::Decrement { id } => serde_json::to_string_pretty(&*cart.decrement(id).await?)?,
    };

    let status = cart.status();
    if let Some(err) = status.last_save_error {
        warn!(error = %err, "Cart change was not written to disk");
        return Err(format!("cart not saved: {err}").into());
    }

    info!(mutations = status.mutations_applied, "Cart command complete");
    Ok(output)
}

/// Installs the stderr tracing subscriber.
///
/// `RUST_LOG` overrides the default `info,gomarket=debug,sqlx=warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gomarket=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
