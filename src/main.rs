use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use movie_code_bot::bot::TelegramBot;
use movie_code_bot::config::BotConfig;

#[derive(Parser)]
#[command(name = "movie-code-bot")]
#[command(about = "A Telegram bot that tells movie titles by codes from videos")]
struct Args {
    /// path to the movie snapshot, overrides MOVIES_FILE
    #[arg(long)]
    movies_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        // only warn if .env file exists but failed to load
        match e {
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // .env file not found, which is fine
            }
            _ => {
                eprintln!("warning: failed to load .env file: {}", e);
            }
        }
    }

    // info by default, RUST_LOG overrides
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    if let Some(movies_file) = args.movies_file {
        config.movies_file = movies_file;
    }
    config.log_summary();

    info!("Starting bot...");

    let bot = TelegramBot::new(&config).await;
    bot.run().await;

    Ok(())
}
