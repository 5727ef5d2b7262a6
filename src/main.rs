use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use simpledi::config::{AppConfig, ConfigLoader};
use simpledi::errors::AppError;
use simpledi::logging::init_logging;
use simpledi::measure_performance;
use simpledi::sample::{bootstrap, ConsoleLogger, Key};

/// Drives the sample game through a scripted key sequence.
#[derive(Parser, Debug)]
#[command(name = "simpledi", version, about)]
struct Args {
    /// Config file (defaults to ~/.config/simpledi/config.toml or $SIMPLEDI_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma separated key presses: G (new session), P, B, E, U
    #[arg(short, long, default_value = "G,P,P,B,U,E")]
    keys: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::with_path(path).load_config()?,
        None => AppConfig::load()?,
    };
    init_logging(config.logging_config()?)?;
    let keys = Key::parse_script(&args.keys)?;

    let app = bootstrap(config, Arc::new(ConsoleLogger))?;
    let failed = measure_performance!("key_script", {
        let mut failed = 0usize;
        for key in keys {
            if let Err(err) = app.press(key).await {
                tracing::error!(%key, error = %err, "Key press failed");
                failed += 1;
            }
        }
        failed
    });

    tracing::info!(
        scene = %app.scene.name(),
        session = ?app.sessions.current_session().map(|ctx| ctx.id()),
        failed,
        "Script finished"
    );
    Ok(())
}
