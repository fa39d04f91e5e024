//! Basic Impacts CLI: import organization records from JSON files.
//!
//! Talks to the API at IMPACTS_API_URL and sends ADMIN_API_KEY as a Bearer token
//! when set. `parse` and `preview` run locally unless `--remote` is given.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use impacts_api_client::{ApiClient, HttpGateway, OrganizationListParams, DEFAULT_API_URL};
use impacts_cli::{init_tracing, parse_assignment, read_source, run_import};
use impacts_ingest::{import_batch, map_value, parse_json};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "impacts", about = "Basic Impacts ingestion CLI")]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "IMPACTS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Admin key for protected endpoints
    #[arg(long, global = true, env = "ADMIN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a file holds valid JSON
    Parse {
        /// Path to a .json or .txt file, or - for stdin
        file: PathBuf,
        /// Ask the server instead of parsing locally
        #[arg(long)]
        remote: bool,
    },
    /// Show the organization a file maps to, without saving it
    Preview {
        file: PathBuf,
        #[arg(long)]
        remote: bool,
    },
    /// Upload a file to the server's parse endpoint
    Upload { file: PathBuf },
    /// Review and create one organization
    Import {
        file: PathBuf,
        /// Edit a field before approval (repeatable), e.g. --set impactScore=80
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        edits: Vec<(String, String)>,
        /// Approve and create; without it the candidate is only shown
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Validate a JSON array and create every element
    Batch { file: PathBuf },
    /// List organizations
    List {
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        region: Option<String>,
        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "1")]
        page: i64,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Show the public leaderboard
    Leaderboard {
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show platform statistics
    Stats,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.api_url, cli.api_key).context("Failed to create API client")?;
    let current_year = chrono::Utc::now().year();

    match cli.command {
        Commands::Parse { file, remote } => {
            let raw = read_source(&file)?;
            if remote {
                print_json(&client.parse(&raw).await?)?;
            } else {
                print_json(&parse_json(&raw)?)?;
            }
        }
        Commands::Preview { file, remote } => {
            let raw = read_source(&file)?;
            if remote {
                print_json(&client.preview(&raw).await?)?;
            } else {
                let value = parse_json(&raw)?;
                print_json(&map_value(&value, current_year)?)?;
            }
        }
        Commands::Upload { file } => {
            print_json(&client.upload(&file).await?)?;
        }
        Commands::Import { file, edits, yes } => {
            let raw = read_source(&file)?;
            let gateway = HttpGateway::new(client);
            let outcome = run_import(&raw, &edits, yes, current_year, &gateway).await?;
            print_json(&outcome)?;
            if outcome.created.is_none() {
                eprintln!("Not saved. Re-run with --yes to create this organization.");
            }
        }
        Commands::Batch { file } => {
            let raw = read_source(&file)?;
            let gateway = HttpGateway::new(client);
            let report = import_batch(&raw, &gateway).await?;
            print_json(&report)?;
            eprintln!("{}", report.summary());
        }
        Commands::List {
            sector,
            region,
            search,
            page,
            limit,
        } => {
            let params = OrganizationListParams {
                page: Some(page),
                limit: Some(limit),
                sector,
                region,
                search,
            };
            print_json(&client.list_organizations(&params).await?)?;
        }
        Commands::Leaderboard {
            sector,
            region,
            limit,
        } => {
            let entries = client
                .leaderboard(sector.as_deref(), region.as_deref(), limit)
                .await?;
            print_json(&entries)?;
        }
        Commands::Stats => {
            print_json(&client.stats().await?)?;
        }
    }

    Ok(())
}
