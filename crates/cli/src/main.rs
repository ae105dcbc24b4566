//! RocketShoes CLI - Drive the shopping cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! rs-cart show
//!
//! # Show the cart as JSON
//! rs-cart show --json
//!
//! # Add one unit of product 1
//! rs-cart add 1
//!
//! # Set the amount of product 1
//! rs-cart update 1 3
//!
//! # Remove product 1
//! rs-cart remove 1
//! ```
//!
//! Every invocation restores the cart from `ROCKETSHOES_STORAGE_PATH`, applies
//! one operation and persists the result. See `rocketshoes_cart::config` for
//! the environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart with totals
    Show {
        /// Print the cart summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add one unit of a product
    Add {
        /// Product id
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        product_id: ProductId,
    },
    /// Set the amount of a product in the cart
    Update {
        /// Product id
        product_id: ProductId,

        /// New amount (values below 1 are ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for the cart library if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=info,rocketshoes_cli=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut session = commands::CartSession::open()?;

    match cli.command {
        Commands::Show { json } => session.show(json)?,
        Commands::Add { product_id } => session.add(product_id).await?,
        Commands::Remove { product_id } => session.remove(product_id)?,
        Commands::Update { product_id, amount } => session.update(product_id, amount).await?,
    }
    Ok(())
}
