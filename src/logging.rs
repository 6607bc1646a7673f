//! Installs the global `tracing` subscriber.

use std::{fs::File, sync::Arc};

use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Log to stderr at `level`, or at the level set by `RUST_LOG` if present.
///
/// If `log_file` is given, everything at `debug` and above is also written to
/// it. Stdout is left free for command output.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn setup_logging(level: LevelFilter, log_file: Option<File>) {
    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        );

    let debug_log = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(debug_log)
        .init();
}
