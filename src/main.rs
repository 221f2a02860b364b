use anyhow::{Context, Result};
use clap::Parser;
use feedpulse::app::App;
use feedpulse::config::Config;
use feedpulse::feed::HttpFetcher;
use feedpulse::state::{SharedStore, Store};
use feedpulse::ui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Get the config directory path (~/.config/feedpulse/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedpulse"))
}

#[derive(Parser, Debug)]
#[command(name = "feedpulse", about = "Terminal RSS aggregator with live refresh")]
struct Args {
    /// Config file (default: ~/.config/feedpulse/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the refresh interval in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Feed URLs to add on startup
    #[arg(value_name = "URL")]
    urls: Vec<String>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;
    if let Some(ms) = args.interval_ms {
        config.poll_interval_ms = ms;
        config.validate().context("Invalid --interval-ms")?;
    }

    let fetcher = Arc::new(HttpFetcher::new(&config).context("Failed to create HTTP client")?);
    let store = SharedStore::new(Store::new());
    let view = store.update(|s| {
        let (renderer, view) = ui::renderer(s.state());
        s.subscribe(renderer);
        view
    });

    let app = App::new(store, fetcher, &config);
    let refresh = app.start_refresh();

    if !args.urls.is_empty() {
        let app = app.clone();
        let urls = args.urls;
        tokio::spawn(async move {
            for url in urls {
                if let Err(e) = app.submit_url(&url).await {
                    tracing::warn!(url = %url, error = %e, "Startup feed not added");
                }
            }
        });
    }

    let result = ui::run(&app, &view, &refresh).await;
    refresh.shutdown().await;
    result?;

    println!("Goodbye!");
    Ok(())
}
