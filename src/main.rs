use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

use taskmaster::api::TodoClient;
use taskmaster::app::{App, AppEvent};
use taskmaster::config::Config;
use taskmaster::list::Features;
use taskmaster::theme::ThemeVariant;
use taskmaster::ui;

/// Get the config directory path (~/.config/taskmaster/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("taskmaster"))
}

#[derive(Parser, Debug)]
#[command(name = "taskmaster", about = "Terminal task list for a REST todo store")]
struct Args {
    /// Base URL of the todo store, e.g. http://192.168.1.178:3000
    #[arg(long, env = "TASKMASTER_SERVER", value_name = "URL")]
    server: Option<String>,

    /// Config file (default: ~/.config/taskmaster/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file (default: ~/.config/taskmaster/taskmaster.log)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Theme variant: dark or light
    #[arg(long)]
    theme: Option<String>,

    /// Title-only items: no completion toggle, no editing
    #[arg(long)]
    minimal: bool,
}

/// Route tracing output to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("taskmaster=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| config_dir.join("taskmaster.log"));
    init_logging(&log_path)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    // --server / TASKMASTER_SERVER win over the config file
    let Some(server_url) = args.server.clone().or_else(|| config.server_url.clone()) else {
        eprintln!("Error: no todo server configured");
        eprintln!();
        eprintln!("Pass one on the command line:");
        eprintln!("  taskmaster --server http://192.168.1.178:3000");
        eprintln!();
        eprintln!(
            "or set TASKMASTER_SERVER, or add server_url to {}",
            config_path.display()
        );
        std::process::exit(1);
    };

    let client = TodoClient::new(&server_url, config.request_timeout())
        .with_context(|| format!("Invalid server URL '{}'", server_url))?;
    tracing::info!(server = %client.base_url(), "Starting taskmaster");

    let features = if args.minimal {
        Features::MINIMAL
    } else {
        config.features
    };

    let mut app = App::new(client, features);

    let theme_name = args.theme.as_deref().unwrap_or(&config.theme);
    match ThemeVariant::from_str_name(theme_name) {
        Some(variant) => app.set_theme(variant),
        None => tracing::warn!(theme = %theme_name, "Unknown theme, using dark"),
    }

    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(%warning, "Keybinding override ignored");
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    tracing::info!("Exiting");
    Ok(())
}
