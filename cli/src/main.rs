mod api;
mod config;
mod fuel;
mod logging;
mod ui;

use anyhow::{Context, Result};
use api::FuelClient;
use clap::Parser;
use config::{Config, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use logging::LogTarget;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use ui::{run_app, App};

#[derive(Parser, Debug)]
#[command(name = "fuelcredit")]
#[command(about = "TUI client for the fuel-credit retail platform", long_about = None)]
struct Args {
    /// Base URL of the fuel-credit backend
    #[arg(short, long, env = "FUELCREDIT_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "FUELCREDIT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Append logs to this file while the TUI is running
    #[arg(long, env = "FUELCREDIT_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Check the backend and list customers without starting the TUI
    #[arg(long)]
    check: bool,
}

fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

async fn check_backend(client: &FuelClient) -> Result<()> {
    println!("Checking {}...", client.base_url());
    match client.list_customers().await {
        Ok(customers) => {
            println!("✅ Backend is reachable!");
            println!("Found {} customers:", customers.len());
            for c in customers {
                println!("  - {} ({}) {}", c.name, c.phone, fuel::format_sar(c.balance()));
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "backend check failed");
            eprintln!("❌ Backend check failed: {}", e);
            eprintln!("Make sure the fuel-credit backend is running on {}", client.base_url());
            Err(e).context("backend check failed")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let target = if args.check {
        LogTarget::Stderr
    } else {
        match &args.log_file {
            Some(path) => LogTarget::File(path.as_path()),
            None => LogTarget::Discard,
        }
    };
    logging::init(target)?;

    let config = Config::new(&args.backend_url, Duration::from_secs(args.timeout_secs))
        .context("invalid configuration")?;
    let client = FuelClient::new(&config).context("failed to build HTTP client")?;
    info!(backend = %config.backend_url, timeout = ?config.request_timeout, "starting");

    // Check mode - probe the backend and exit
    if args.check {
        return check_backend(&client).await;
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(client)).await;

    // Restore terminal
    cleanup_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = ?err, "ui loop failed");
        eprintln!("Error: {:?}", err);
    }

    info!("exiting");
    Ok(())
}
