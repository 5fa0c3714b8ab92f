use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use weather_today::core::config::{self, CliOverrides};
use weather_today::tui;

#[derive(Parser)]
#[command(name = "weather-today", about = "Ask for the weather from your terminal")]
struct Args {
    /// Chat API base URL (overrides config and WEATHER_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Path of the chat endpoint on the base URL
    #[arg(long)]
    api_path: Option<String>,

    /// Never ring the terminal bell
    #[arg(long)]
    no_haptics: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to weather-today.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("weather-today.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("Ignoring config file: {}", e);
            config::WeatherConfig::default()
        }
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            base_url: args.base_url,
            api_path: args.api_path,
            no_haptics: args.no_haptics,
        },
    );

    log::info!(
        "Weather Today starting up against {}{}",
        resolved.base_url,
        resolved.api_path
    );

    tui::run(resolved)
}
