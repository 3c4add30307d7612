//! rugscan CLI: serve, scan, news.

use clap::{Parser, Subcommand};
use rugscan::news::collect_news;
use rugscan::{Aggregator, CoinReport, Fetcher, RugscanConfig, ScanRequest};
use rugscan_report::render_document;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let mut c = RugscanConfig::load_from_path(path)?;
            c.apply_env(|key| std::env::var(key).ok());
            c
        }
        None => RugscanConfig::load(),
    };
    match cli.command {
        Command::Serve(args) => run_serve(config, args),
        Command::Scan(args) => run_scan(config, args),
        Command::News => run_news(config),
    }
}

#[derive(Parser)]
#[command(name = "rugscan")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "Token rug-pull risk scanner: market, holder and sentiment data in one report")]
struct Cli {
    /// JSON config file. Defaults to RUGSCAN_CONFIG_PATH, ./config/rugscan.json, ./rugscan.json.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Scan one coin and print the risk summary.
    Scan(ScanArgs),
    /// Print the latest headlines from both news feeds.
    News,
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address, e.g. 0.0.0.0:8888.
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Parser)]
struct ScanArgs {
    /// Coin name, symbol or id.
    query: String,
    #[arg(long)]
    audit_link: Option<String>,
    /// Write the standalone HTML report here.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print the full report as JSON instead of the summary.
    #[arg(long)]
    json: bool,
}

fn run_serve(mut config: RugscanConfig, args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(rugscan_server::serve(&config))?;
    Ok(())
}

fn run_scan(config: RugscanConfig, args: ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Arc::new(Fetcher::new(config.fetch_config())?);
    let aggregator = Aggregator::from_config(&config, fetcher.clone());
    let req = ScanRequest::new(args.query).with_audit_link(args.audit_link);

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(aggregator.scan(&req))?;
    info!(requests = fetcher.request_count(), "scan complete");

    if let Some(out) = &args.out {
        render_document(&report, out)?;
        info!(path = %out.display(), "report written");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &CoinReport) {
    println!(
        "{} ({})\t{}",
        report.display_name(),
        report.display_symbol(),
        rugscan_report::format_price(report.data.price)
    );
    println!("searched {} in {:.2}s", report.search_time, report.query_duration);
    for risk in &report.risks {
        println!("RISK\t{}", risk);
    }
    for err in &report.errors {
        println!("ERROR\t{}", err);
    }
    if let Some(info) = &report.chain_info {
        println!("NOTE\t{}", info);
    }
    println!("{}", report.verdict);
}

fn run_news(config: RugscanConfig) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Fetcher::new(config.fetch_config())?;
    let rt = tokio::runtime::Runtime::new()?;
    let digest = rt.block_on(collect_news(&fetcher));
    for (feed, articles) in [("coingecko", &digest.coingecko), ("crypto.news", &digest.cryptonews)] {
        for a in articles {
            println!("{}\t{}\t{}", feed, a.title, a.url);
        }
    }
    Ok(())
}
