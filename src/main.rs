use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use prelim::app::App;
use prelim::config::Config;
use prelim::logging;
use prelim::session::Step;
use prelim::steps::catalog;
use prelim::ui::install_panic_hook;

#[derive(Parser)]
#[command(name = "prelim")]
#[command(about = "Guided walkthrough of the pet-service prelim exam")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Service root URL (overrides api.base_url)
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every step with its endpoint
    Steps,

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    // No subcommand means the wizard owns the terminal
    let is_tui_mode = cli.command.is_none();
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Steps) => cmd_steps(),
        Some(Commands::Config) => cmd_config(&config)?,
        None => run_tui(&config, logging_handle.log_file_path).await?,
    }

    Ok(())
}

async fn run_tui(config: &Config, log_file_path: Option<PathBuf>) -> Result<()> {
    install_panic_hook();

    let mut app = App::new(config)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_steps() {
    println!("{:>4}  {:<24} {}", "Step", "Title", "Endpoint");
    println!("{}", "─".repeat(60));
    for step in Step::all() {
        let info = catalog::info(step);
        println!("{:>4}  {:<24} {}", step.number(), info.title, info.endpoint);
    }
}

fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
