use std::{fs, path::Path};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod formatter;
pub mod writer;

pub use formatter::*;
pub use writer::*;

use crate::configs::LoggingConfig;

/// Builds the filter directive string from the logging config. Upstream HTTP
/// internals are kept at `warn` unless the filters say otherwise.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let level = config.level.as_deref().unwrap_or("info");
    match config.filters.as_deref() {
        Some(filters) if !filters.is_empty() => {
            format!("{},hyper=warn,reqwest=warn,{}", level, filters)
        }
        _ => format!("{},hyper=warn,reqwest=warn", level),
    }
}

pub fn init(config: &LoggingConfig) {
    // RUST_LOG wins over the config file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let stdout_layer = fmt::layer()
        .event_format(LineFormatter::new(true))
        .with_ansi(true);

    let file_layer = config.file.as_ref().map(|file_config| {
        if let Some(parent) = Path::new(&file_config.path).parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory: {}", e);
            }
        }

        fmt::layer()
            .with_writer(CappedFileWriter::new(
                file_config.path.clone(),
                file_config.max_lines,
            ))
            .event_format(LineFormatter::new(false))
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}
