mod batch;
mod export;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revscrape_core::{resolve, BackendKind, MAX_PAGES_LIMIT};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revscrape")]
#[command(about = "Extract Amazon product reviews to CSV")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract reviews for one or more products and export them as CSV
    Extract {
        /// Product URLs
        urls: Vec<String>,

        /// Read product URLs from a file, one per line
        #[arg(long)]
        file: Option<PathBuf>,

        /// Review pages to fetch per product (overrides REVSCRAPE_MAX_PAGES)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGES_LIMIT)))]
        max_pages: Option<u32>,

        /// Retrieval backend: static or browser (overrides REVSCRAPE_BACKEND)
        #[arg(long)]
        backend: Option<BackendKind>,

        /// Route each product through the next proxy from the rotator
        #[arg(long)]
        proxies: bool,

        /// Output file (defaults to avis_<timestamp>.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Field delimiter, a single ASCII character
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
    /// Print the canonical product reference for each URL
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = revscrape_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(
        env = %config.env,
        backend = %config.backend,
        max_pages = config.max_pages,
        "configuration loaded"
    );

    match cli.command {
        Commands::Extract {
            urls,
            file,
            max_pages,
            backend,
            proxies,
            output,
            delimiter,
        } => {
            let delimiter = export::delimiter_byte(delimiter)?;
            let mut inputs = urls;
            if let Some(path) = file {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("could not read {}: {e}", path.display()))?;
                inputs.extend(batch::parse_url_list(&text));
            }
            if inputs.is_empty() {
                anyhow::bail!("no product URLs given; pass URLs or --file");
            }

            let settings = batch::BatchSettings {
                max_pages: max_pages.unwrap_or(config.max_pages),
                backend: backend.unwrap_or(config.backend),
                use_proxies: proxies || config.use_proxies,
            };
            let rows = batch::run_batch(&config, &inputs, &settings).await?;

            let path = output.unwrap_or_else(|| export::default_output_path(chrono::Local::now()));
            export::export_csv(&path, &rows, delimiter)?;
            println!("{} rows written to {}", rows.len(), path.display());
        }
        Commands::Resolve { urls } => {
            for url in &urls {
                match resolve(url, config.default_domain) {
                    Ok(reference) => println!(
                        "{}\t{}\t{}",
                        reference.product_id(),
                        reference.domain(),
                        reference.canonical_url()
                    ),
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }

    Ok(())
}
