use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Tracing goes to stderr (stdout belongs to the reporter) and to a log
/// file. Returns the appender guard; dropping it flushes the file.
pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "warn".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "datachecker.log".to_string());

    let file_appender = tracing_appender::rolling::never("./", log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    guard
}
