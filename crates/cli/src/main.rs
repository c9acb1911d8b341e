//! Meridian CLI - operator tools for the back-office.
//!
//! # Usage
//!
//! ```bash
//! # Validate the deployed environment configuration
//! meridian-cli config check
//!
//! # Produce an argon2 hash for a password
//! meridian-cli password hash 'the-password'
//!
//! # Generate a high-entropy JWT secret
//! meridian-cli secret generate
//!
//! # Print the built-in role permission tables
//! meridian-cli roles list
//! ```
//!
//! Account and role seeding happens inside the service at startup; this
//! binary carries the tools that are useful without a running instance.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Operator tool: stdout/stderr are the interface.
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "meridian-cli")]
#[command(author, version, about = "Meridian Voyages CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Password utilities
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
    /// Secret utilities
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
    /// Role information
    Roles {
        #[command(subcommand)]
        action: RolesAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate environment configuration
    Check,
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Hash a password with argon2id
    Hash {
        /// The password to hash
        password: String,
    },
}

#[derive(Subcommand)]
enum SecretAction {
    /// Generate a high-entropy signing secret
    Generate,
}

#[derive(Subcommand)]
enum RolesAction {
    /// Print the built-in role permission tables
    List,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "meridian_cli=info".to_owned()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Config {
            action: ConfigAction::Check,
        } => commands::config::check().map_err(Into::into),
        Commands::Password {
            action: PasswordAction::Hash { password },
        } => commands::password::hash(&password).map_err(Into::into),
        Commands::Secret {
            action: SecretAction::Generate,
        } => commands::secret::generate().map_err(Into::into),
        Commands::Roles {
            action: RolesAction::List,
        } => commands::roles::list().map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
