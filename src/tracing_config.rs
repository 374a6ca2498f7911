use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_DIR: &str = "./logs";
const LOG_FILE: &str = "blog_server.log";

/// Console gets INFO and above, the daily log file under `./logs` gets DEBUG and above.
///
/// `RUST_LOG` overrides the console level when set.
///
/// The returned guard owns the background file writer. Keep it alive in `main`,
/// buffered lines are flushed when it drops.
pub fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    // blog_server.log.YYYY-MM-DD, one file per day
    let file_appender = rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true)
        .with_filter(EnvFilter::new("debug"));

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(dir = LOG_DIR, file = LOG_FILE, "Tracing initialized");

    guard
}
