//=========================================================================
// Logging
//=========================================================================
//
// One-shot `env_logger` setup for hosts. The engine itself only talks to
// the `log` facade, using these targets:
//
//   "scene"      sprite registry, scene lifecycle, stats
//   "scheduler"  frame handler registration
//   "physics"    overlap and edge contacts
//   "serial"     serial device and transport
//   "platform"   winit window and input
//   "engine"     runtime, pacing, deep sleep
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "arcade_engine=debug", "scene=trace,serial=warn"). When unset,
/// `RUST_LOG` is honored, falling back to `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored, as is an
/// already-installed logger.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!(target: "engine", "Logging initialized");
        }
    });
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig {
            env_filter: Some("warn".to_string()),
            ..LoggingConfig::default()
        });
        init_logging(LoggingConfig::default());
        log::info!(target: "engine", "still fine");
    }
}
