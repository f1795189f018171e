use anyhow::Result;
use clap::{Parser, Subcommand};

use vitals::{cli, web};

#[derive(Debug, Parser)]
#[command(name = "vitals")]
#[command(about = "Personal body-metrics fetcher, cleaner, and dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the browser authorization flow and print the token handoff lines
    Auth {
        /// OAuth2 client id registered with the provider
        client_id: String,
        /// OAuth2 client secret
        client_secret: String,
    },
    /// Fetch new body-log entries into body_data.csv
    Fetch {
        /// Metric categories to fetch (weight, fat)
        #[arg(long, value_delimiter = ',', default_value = "weight")]
        categories: Vec<String>,
    },
    /// Normalize body_data.csv into clean_body_data.csv
    Clean,
    /// Serve the dashboard
    Web {
        /// Address to bind
        #[arg(long, default_value = web::DEFAULT_ADDR)]
        addr: String,
    },
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Auth {
            client_id,
            client_secret,
        } => cli::run_auth(&client_id, &client_secret),
        Commands::Fetch { categories } => cli::run_fetch(&categories),
        Commands::Clean => cli::run_clean(),
        Commands::Web { addr } => cli::run_web(&addr),
    }
}
