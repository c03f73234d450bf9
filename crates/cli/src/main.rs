//! Atelier CLI - Terminal front end for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! atelier products list --search polo --category polo --page 2 --per-page 4
//!
//! # Featured categories
//! atelier categories --per-category 4
//!
//! # Sign in, then manage products
//! atelier auth login -e shopper@example.com
//! atelier products add --name "Áo Polo" --description "Cotton" --price 250000 --category polo
//! atelier products edit 42 --price 199000
//! atelier products delete 42
//! ```
//!
//! # Commands
//!
//! - `products` - List, show, add, edit and delete products
//! - `categories` - Per-category carousels
//! - `auth` - Login, register, Google sign-in, logout, whoami

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::process::ExitCode;

use atelier_storefront::catalog::ItemsPerPage;
use atelier_storefront::config::StorefrontConfig;
use atelier_storefront::state::AppState;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod prompt;
mod render;

use commands::products::{ProductChanges, ProductFields};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Show featured categories with their first products
    Categories {
        /// Products shown per category
        #[arg(short = 'n', long, default_value_t = 4)]
        per_category: usize,
    },
    /// Sign in, sign up and sign out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, filtered and paginated
    List {
        /// Case-insensitive text matched against name and description
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category tag (`polo`, `thun`, `jean`, `au`, `somi`, ...) or `all`
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Products per page (4, 8, 12, 16 or 20)
        #[arg(long, default_value = "8", value_parser = parse_per_page)]
        per_page: ItemsPerPage,
    },
    /// Show one product with related products (requires login)
    Show {
        /// Product ID
        id: String,
    },
    /// Add a product (requires login)
    Add(ProductFields),
    /// Edit a product; omitted fields keep their value (requires login)
    Edit {
        /// Product ID
        id: String,

        #[command(flatten)]
        changes: ProductChanges,
    },
    /// Delete a product (requires login)
    Delete {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from the terminal when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        email: String,

        /// Read from the terminal when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign in with Google
    Google,
    /// Sign out on this machine
    Logout,
    /// Show the signed-in user
    Whoami,
}

fn parse_per_page(value: &str) -> Result<ItemsPerPage, String> {
    let n: u32 = value.parse().map_err(|e| format!("{e}"))?;
    ItemsPerPage::try_from(n).map_err(|e| e.to_string())
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(io::stderr(), "Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atelier_storefront=info,atelier_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    match run(cli, &state, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = stdout.flush();
            let _ = render::failure(&mut io::stderr().lock(), &e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, state: &AppState, out: &mut impl Write) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                search,
                category,
                page,
                per_page,
            } => commands::products::list(state, out, search, category, page, per_page).await,
            ProductsAction::Show { id } => commands::products::show(state, out, id.into()).await,
            ProductsAction::Add(fields) => commands::products::add(state, out, fields.into()).await,
            ProductsAction::Edit { id, changes } => {
                commands::products::edit(state, out, id.into(), changes).await
            }
            ProductsAction::Delete { id } => {
                commands::products::delete(state, out, id.into()).await
            }
        },
        Commands::Categories { per_category } => {
            commands::categories::carousels(state, out, per_category).await
        }
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(state, out, email, password).await
            }
            AuthAction::Register { email, password } => {
                commands::auth::register(state, out, email, password).await
            }
            AuthAction::Google => commands::auth::google(state, out).await,
            AuthAction::Logout => commands::auth::logout(state, out),
            AuthAction::Whoami => commands::auth::whoami(state, out),
        },
    }
}
