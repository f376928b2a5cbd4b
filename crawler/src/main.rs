use anyhow::{Context, Result};
use clap::Parser;
use sitesearch_core::persist::IndexPaths;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

mod crawl;
mod fetch;
mod page;

use crawl::{CrawlConfig, Crawler};
use fetch::HttpFetcher;

#[derive(Parser)]
#[command(name = "crawler")]
#[command(about = "Crawl one site from a seed URL and build its search index")]
struct Cli {
    /// Seed URL the crawl starts from
    #[arg(long)]
    seed: String,
    /// URL prefix that counts as internal; defaults to the seed's origin
    #[arg(long)]
    prefix: Option<String>,
    /// Index directory to rebuild (wiped at the start of the run)
    #[arg(long, default_value = "./index")]
    index: String,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// User-Agent header sent with every request
    #[arg(long, default_value = "sitesearch-crawler/0.1")]
    user_agent: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let seed = Url::parse(&cli.seed).context("invalid seed url")?;
    let prefix = match cli.prefix {
        Some(p) => p,
        None => {
            let mut origin = seed.clone();
            origin.set_path("/");
            origin.set_query(None);
            origin.set_fragment(None);
            origin.to_string()
        }
    };
    tracing::info!(%seed, %prefix, index = %cli.index, "starting crawl");

    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout_secs), &cli.user_agent)?;
    let paths = IndexPaths::new(&cli.index);
    let mut crawler = Crawler::new(CrawlConfig { seed, prefix }, fetcher);
    let stats = crawler.run(&paths)?;

    tracing::info!(
        pages = stats.pages_indexed,
        failures = stats.fetch_failures,
        index = %cli.index,
        "crawl complete"
    );
    Ok(())
}
