//! Under One Roof console - catalog positions, stock and status.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from U1R_ADMIN_PASSWORD or the first line of stdin)
//! u1r login -e admin@u1rfoods.com
//!
//! # Show a category's products grouped and in display order
//! u1r positions show -c 66a1f0c2e4b0a1
//!
//! # Move product B before product A (same group only)
//! u1r positions move -c 66a1f0c2e4b0a1 --item B --over A
//!
//! # Flip stock availability of a product
//! u1r product stock 66b1f0c2e4b0ff
//!
//! # Retail catalog instead of wholesale
//! u1r --mode retail products --search rice
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` - Manage the stored admin session
//! - `categories`, `subcategories`, `products` - Browse the catalog
//! - `positions` - Order products within a category
//! - `subcategory-positions` - Order subcategories within a category
//! - `product` - Toggle stock or status, delete

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use u1r_admin::{AdminConfig, AdminError};
use u1r_core::Mode;

mod commands;
mod render;
mod telemetry;

use commands::{ConsoleNotifier, Context};

#[derive(Parser)]
#[command(name = "u1r")]
#[command(author, version, about = "Under One Roof catalog console")]
struct Cli {
    /// Catalog mode: wholesale or retail (overrides `U1R_MODE`)
    #[arg(long, global = true)]
    mode: Option<Mode>,

    /// Catalog Store base URL (overrides `U1R_API_BASE`)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the admin token
    Login {
        /// Admin email address
        #[arg(short, long)]
        email: String,
    },
    /// Forget the stored admin token
    Logout,
    /// List categories
    Categories,
    /// List subcategories
    Subcategories {
        /// Only subcategories of this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List products
    Products {
        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,

        /// Weight label (wholesale only; `all` for no filter)
        #[arg(short, long)]
        weight: Option<String>,

        /// Only products of this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Order products within a category
    Positions {
        #[command(subcommand)]
        action: PositionsAction,
    },
    /// Order subcategories within a category
    SubcategoryPositions {
        #[command(subcommand)]
        action: PositionsAction,
    },
    /// Change a single product
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum PositionsAction {
    /// Show the current order
    Show {
        /// Category ID
        #[arg(short, long)]
        category: String,
    },
    /// Move an item to the place of another item in the same group
    Move {
        /// Category ID
        #[arg(short, long)]
        category: String,

        /// ID of the item to move
        #[arg(long)]
        item: String,

        /// ID of the item whose place it takes
        #[arg(long)]
        over: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Flip stock availability (in stock becomes 0, out of stock becomes 1)
    Stock {
        /// Product ID
        id: String,
    },
    /// Flip the active flag
    Status {
        /// Product ID
        id: String,
    },
    /// Delete the product
    Delete {
        /// Product ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "error: {e}");
            std::process::exit(2);
        }
    };

    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(&config);

    let ctx = Context::new(config, Arc::new(ConsoleNotifier));
    if let Err(e) = run(cli.command, &ctx).await {
        report_failure(e.as_ref());
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<AdminConfig, u1r_admin::ConfigError> {
    let mut config = AdminConfig::from_env()?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(api_base) = &cli.api_base {
        config.set_api_base(api_base)?;
    }
    Ok(config)
}

async fn run(command: Commands, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Login { email } => commands::auth::login(ctx, &email).await?,
        Commands::Logout => commands::auth::logout(ctx).await?,
        Commands::Categories => commands::catalog::categories(ctx).await?,
        Commands::Subcategories { category } => {
            commands::catalog::subcategories(ctx, category.as_deref()).await?;
        }
        Commands::Products {
            search,
            weight,
            category,
        } => commands::catalog::products(ctx, search, weight, category.as_deref()).await?,
        Commands::Positions { action } => match action {
            PositionsAction::Show { category } => {
                commands::positions::show_products(ctx, &category).await?;
            }
            PositionsAction::Move {
                category,
                item,
                over,
            } => commands::positions::move_product(ctx, &category, &item, over.as_deref()).await?,
        },
        Commands::SubcategoryPositions { action } => match action {
            PositionsAction::Show { category } => {
                commands::positions::show_subcategories(ctx, &category).await?;
            }
            PositionsAction::Move {
                category,
                item,
                over,
            } => {
                commands::positions::move_subcategory(ctx, &category, &item, over.as_deref())
                    .await?;
            }
        },
        Commands::Product { action } => match action {
            ProductAction::Stock { id } => commands::product::toggle_stock(ctx, &id).await?,
            ProductAction::Status { id } => commands::product::toggle_status(ctx, &id).await?,
            ProductAction::Delete { id } => commands::product::delete(ctx, &id).await?,
        },
    }
    Ok(())
}

/// Tell the operator what went wrong.
///
/// Catalog failures inside the services have already been shown by the
/// notifier; everything else is shown here.
fn report_failure(error: &(dyn std::error::Error + 'static)) {
    let mut stderr = std::io::stderr();
    match error.downcast_ref::<AdminError>() {
        Some(AdminError::Catalog { .. }) => {}
        Some(admin_error) => {
            admin_error.report();
            let _ = writeln!(stderr, "error: {}", admin_error.user_message());
        }
        None => {
            tracing::error!("Command failed: {error}");
            let _ = writeln!(stderr, "error: {error}");
        }
    }

    if error
        .downcast_ref::<AdminError>()
        .is_some_and(AdminError::requires_login)
    {
        let _ = writeln!(stderr, "hint: run `u1r login -e <email>` first");
    }
}
