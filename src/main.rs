use clap::{Parser, Subcommand};
use eventim_scraper::apis::backend::BackendClient;
use eventim_scraper::apis::eventim::EventimClient;
use eventim_scraper::app::ports::EventSource;
use eventim_scraper::config::{Config, DEFAULT_CONFIG_PATH};
use eventim_scraper::extract::parse_detail_page;
use eventim_scraper::ledger::open_ledgers;
use eventim_scraper::logging;
use eventim_scraper::pipeline::Pipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "eventim_scraper")]
#[command(about = "Republishes Eventim events to the local events API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every category and publish new events
    Run,
    /// Fetch one event page and print the extracted fields
    Inspect {
        /// Event detail page URL
        #[arg(long)]
        url: String,
    },
    /// List organizers registered in earlier runs
    Organizers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging(Path::new(logging::LOG_DIR));

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run => {
            println!("🚀 Running Eventim pipeline...");
            let (processed, organizers) = open_ledgers(&config.storage)?;
            let backend = Arc::new(BackendClient::new(&config)?);
            let pipeline = Pipeline::new(
                config.clone(),
                Arc::new(EventimClient::new(&config)?),
                backend.clone(),
                backend,
                processed,
                organizers,
            );

            match pipeline.run().await {
                Ok(result) => {
                    println!("\n📊 Pipeline Results:");
                    println!("   Total events: {}", result.total_events);
                    println!("   Published: {}", result.published_events);
                    println!("   Skipped: {}", result.skipped_events);
                    println!("   Failed: {}", result.failed_events);
                    if !result.errors.is_empty() {
                        println!("\n⚠️  Errors encountered:");
                        for error in &result.errors {
                            println!("   - {}", error);
                        }
                    }
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Inspect { url } => {
            let client = EventimClient::new(&config)?;
            let html = client.fetch_detail_page(&url).await?;
            let fields = parse_detail_page(&html);
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        Commands::Organizers => {
            let (_, organizers) = open_ledgers(&config.storage)?;
            let all = organizers.all()?;
            println!("👥 {} registered organizers", all.len());
            for organizer in all {
                let token = if organizer.token.is_some() { "token" } else { "no token" };
                println!("   - {} <{}> ({})", organizer.name, organizer.email, token);
            }
        }
    }
    Ok(())
}
