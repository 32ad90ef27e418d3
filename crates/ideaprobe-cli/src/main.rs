use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ideaprobe_core::AppConfig;
use ideaprobe_engine::ScrapingService;
use ideaprobe_scraper::AppStoreScraper;

#[derive(Debug, Parser)]
#[command(name = "ideaprobe")]
#[command(about = "Validate a business idea against external data sources")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every registered source for an idea and print the aggregated result
    Validate {
        /// The business idea text to validate
        idea: String,

        /// Write the JSON result to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the fan-out concurrency cap
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Override the global deadline in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// List the registered data sources
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| {
        let level = std::env::var("IDEAPROBE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::try_new(level)
    })?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Validate {
            idea,
            output,
            max_concurrent,
            timeout_secs,
        }) => {
            let mut config = load_config_or_exit();
            if let Some(n) = max_concurrent {
                config.max_concurrent_sources = n.max(1);
            }
            if let Some(secs) = timeout_secs {
                config.total_timeout_secs = secs;
            }
            run_validate(&config, &idea, output.as_deref()).await?;
        }
        Some(Commands::Sources) => {
            let config = load_config_or_exit();
            let service = build_service(&config);
            for name in service.sources() {
                println!("{name}");
            }
        }
        None => println!("ideaprobe: use `validate` or `sources` (see --help)"),
    }

    Ok(())
}

async fn run_validate(
    config: &AppConfig,
    idea: &str,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let service = build_service(config);
    if service.sources().is_empty() {
        eprintln!("warning: no scrapers could be registered; the result will be empty");
    }

    let result = service.scrape(idea).await;
    service.close().await;

    let json = serde_json::to_string_pretty(&result)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("result written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn build_service(config: &AppConfig) -> ScrapingService {
    let mut service = ScrapingService::new(config);
    match AppStoreScraper::new(config) {
        Ok(scraper) => service.register(Arc::new(scraper)),
        Err(e) => tracing::warn!(error = %e, "failed to build App Store scraper"),
    }
    service
}

fn load_config_or_exit() -> AppConfig {
    ideaprobe_core::load_app_config().unwrap_or_else(|e| {
        eprintln!("error: invalid configuration: {e}");
        std::process::exit(1);
    })
}
