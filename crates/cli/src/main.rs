//! Xstore CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run the shared migrations
//! xstore-cli migrate
//!
//! # Load cities and products from YAML
//! xstore-cli seed data/seed.yaml
//!
//! # Bootstrap the first super admin
//! xstore-cli admin create -e owner@xstore.in -p 'long passphrase' -r super_admin
//!
//! # Delete expired approval codes
//! xstore-cli otp purge
//! ```
//!
//! Every command reads `ADMIN_DATABASE_URL` (falling back to `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "xstore-cli")]
#[command(author, version, about = "Xstore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Upsert cities and insert products from a YAML file
    Seed {
        /// Path to the YAML file
        file: String,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage admin approval codes
    Otp {
        #[command(subcommand)]
        action: OtpAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an account with admin access
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Admin role (`super_admin`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[derive(Subcommand)]
enum OtpAction {
    /// Delete expired approval codes
    Purge,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                role,
            } => {
                commands::admin::create_user(&email, &password, &role).await?;
            }
        },
        Commands::Otp { action } => match action {
            OtpAction::Purge => {
                commands::otp::purge().await?;
            }
        },
    }
    Ok(())
}
