//! Advisor site CLI - contact form submission, health checks and store
//! migrations.
//!
//! # Usage
//!
//! ```bash
//! # Submit the contact form to a running server
//! advisor-cli submit -n "Jane Tan" -e jane@example.com -p "+65 9123 4567" \
//!     -m "Interested in retirement planning"
//!
//! # Check a server
//! advisor-cli --endpoint https://advisor.example health
//!
//! # Run key-value store migrations
//! advisor-cli migrate
//!
//! # Print a stored submission
//! advisor-cli show <id>
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use advisor_site_cli::ContactFormFields;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "advisor-cli")]
#[command(author, version, about = "Advisor site CLI tools")]
struct Cli {
    /// Base URL of the contact server
    #[arg(long, global = true, default_value = "http://127.0.0.1:3000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit the contact form
    Submit {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        phone: String,

        #[arg(short, long)]
        message: String,

        /// Address quoted when the submission fails
        #[arg(long, default_value = advisor_site_server::config::DEFAULT_TO)]
        fallback_email: String,
    },
    /// Check server health
    Health,
    /// Run key-value store migrations
    Migrate,
    /// Print a stored submission
    Show {
        /// Submission ID (`contact_...`)
        id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisor_cli=info,advisor_site_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Submit {
            name,
            email,
            phone,
            message,
            fallback_email,
        } => {
            let fields = ContactFormFields::new(name, email, phone, message);
            commands::contact::submit(&cli.endpoint, &fallback_email, fields).await?;
        }
        Commands::Health => commands::contact::health(&cli.endpoint).await?,
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Show { id } => commands::submissions::show(&id).await?,
    }
    Ok(())
}
