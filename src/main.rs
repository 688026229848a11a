use tracing::{Level as TraceLevel, info, warn};
use tracing_subscriber::FmtSubscriber;

use sense_customizer::fs::StdFileSystem;
use sense_customizer::image::PngLoader;
use sense_customizer::{Session, default_game_dir};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let game_dir = default_game_dir();
    info!(dir = %game_dir.display(), version = env!("CARGO_PKG_VERSION"), "Starting sense-customizer");

    let mut session = Session::open(game_dir, Box::new(StdFileSystem), Box::new(PngLoader::new()));
    let report = session.save();

    if report.is_clean() {
        info!("Game directory is up to date");
    } else {
        warn!(
            config_failures = report.config_failures,
            decor_failures = report.decor.failed,
            "Some changes could not be written; they will be retried on the next save"
        );
    }

    Ok(())
}
