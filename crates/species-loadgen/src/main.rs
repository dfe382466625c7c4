//! species-loadgen
//!
//! Generates seed data, drives load against the species service and
//! summarizes the resulting response log.

use clap::{Args, Parser, Subcommand};
use species_loadgen::generate::{generate_species, write_seed_file};
use species_loadgen::load::{self, LoadConfig};
use species_loadgen::summary::summarize_file;
use species_loadgen::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "species-loadgen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a JSON file of random species records
    Generate {
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Fixed RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "species_seed.json")]
        output: PathBuf,
    },
    /// Issue lookups from concurrent workers and log every response
    Run(RunArgs),
    /// Aggregate a response log into summary statistics
    Summarize {
        #[arg(long, default_value = "responses.log")]
        input: PathBuf,
        #[arg(long, default_value = "summary.json")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, env = "THREADS", default_value_t = 5)]
    threads: usize,
    /// Requests per minute, per worker
    #[arg(long, env = "RATE", default_value_t = 6.0)]
    rate: f64,
    #[arg(
        long,
        env = "SPECIES_IDS",
        value_delimiter = ',',
        default_value = "1,2,3,4,5,6,7,8,9,10"
    )]
    species_ids: Vec<String>,
    #[arg(long, env = "SERVER_URL", default_value = "http://localhost:8080")]
    server_url: String,
    #[arg(long, env = "OUTPUT_FILE", default_value = "responses.log")]
    output_file: PathBuf,
    #[arg(long, env = "CLIENT_NAME", default_value = "default-client")]
    client_name: String,
    /// Stop after this many seconds instead of running until Ctrl-C
    #[arg(long)]
    duration_secs: Option<u64>,
    /// Give up on a request after this many seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 10)]
    timeout_secs: u64,
}

impl From<RunArgs> for LoadConfig {
    fn from(args: RunArgs) -> Self {
        LoadConfig {
            threads: args.threads,
            rate: args.rate,
            species_ids: args
                .species_ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            server_url: args.server_url,
            output_file: args.output_file,
            client_name: args.client_name,
            duration: args.duration_secs.map(Duration::from_secs),
            timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::from_default_env().add_directive("species_loadgen=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            count,
            seed,
            output,
        } => {
            let records = generate_species(count, seed);
            write_seed_file(&output, &records).await?;
        }
        Command::Run(args) => {
            load::run(args.into(), async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "Failed to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            })
            .await?;
        }
        Command::Summarize { input, output } => {
            let summary = summarize_file(&input, &output).await?;
            info!(
                total_requests = summary.total_requests,
                total_429_errors = summary.total_429_errors,
                cache_hit_rate = summary.cache_hit_rate,
                "Wrote summary to {}",
                output.display()
            );
        }
    }

    Ok(())
}
