mod config;
mod conn;
mod error;
mod fetch;
mod model;
mod pipeline;
mod report;
mod web;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};

use config::{Config, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "weather-graph")]
#[command(about = "Render a sensor's recent temperature and humidity history as an HTML chart")]
struct Args {
    /// Config file path (defaults apply when config.json is absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sensor to report
    #[arg(short, long)]
    sensor: Option<String>,

    /// Number of hours of history to chart
    #[arg(long)]
    hours: Option<u32>,

    /// SQLite database file path
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Window is in local time rather than UTC
    #[arg(long)]
    local_time: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the page over HTTP, rendering it on every request
    Serve {
        #[arg(long)]
        ip: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let (path, required) = match &args.config {
        Some(path) => (path.as_path(), true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = Config::load(path, required)?;

    if let Some(sensor) = &args.sensor {
        config.sensor_id = sensor.clone();
    }
    if let Some(hours) = args.hours {
        config.lookback_hours = hours;
    }
    if let Some(database) = &args.database {
        config.database_path = database.clone();
    }
    if args.local_time {
        config.local_time = true;
    }
    if let Some(Command::Serve { ip, port }) = &args.command {
        if let Some(ip) = ip {
            config.web_server_ip = ip.clone();
        }
        if let Some(port) = port {
            config.web_server_port = *port;
        }
    }

    debug!("Using {:?}", config);
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if args.command.is_some() {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
        runtime.block_on(web::start_web_server(config))?;
        return Ok(());
    }

    let outcome = pipeline::generate(&config, Utc::now())?;

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}", outcome)?;
    stdout.flush()?;

    Ok(())
}
