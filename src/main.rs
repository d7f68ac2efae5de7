use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod app;
mod config;
mod error;
mod links;
mod media;
mod permission;
mod ui;
mod utils;

#[derive(Parser, Debug)]
#[command(author, version, about = "Download Instagram posts to a local media library", long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// Directory to save media into (overrides the config file)
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// File with one post link per line
    #[arg(short = 'f', long)]
    links_file: Option<String>,

    /// Read commands from stdin instead of downloading straight away
    #[arg(short, long)]
    interactive: bool,

    /// Post links to download
    links: Vec<String>,
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/insta-manager/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/insta-manager/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = get_config_path(&args);
    let config = match &config_path {
        Some(path) => config::Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => config::Config::default(),
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("Starting InstaManager...");
    match &config_path {
        Some(path) => info!("Loaded config from: {}", path),
        None => info!("No config file found, using defaults"),
    }

    let mut session = app::Session::from_config(&config, args.library.clone())
        .context("Failed to set up download session")?;

    if args.interactive {
        return ui::run_interactive(&mut session, &args.links).await;
    }

    if args.links.is_empty() && args.links_file.is_none() {
        anyhow::bail!("No links given. Pass post links, --links-file, or --interactive.");
    }

    let succeeded = ui::run_batch(&mut session, &args.links, args.links_file.as_deref()).await?;
    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}
