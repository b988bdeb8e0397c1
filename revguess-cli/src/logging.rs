//! Logging setup
//!
//! The subscriber is installed before configuration is resolved, so events
//! logged while locating and reading the config file reach stderr. It
//! starts at `RUST_LOG` (or the compiled default level) and switches to the
//! configured `logging.level` once that is known. `RUST_LOG` always wins.

use anyhow::{Context, Result};
use revguess_common::config::CompiledDefaults;
use tracing::{debug, warn, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Handle for switching the active log level after startup
pub struct LogLevel {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogLevel {
    /// Apply the level from the config file, unless `RUST_LOG` set one
    ///
    /// An unparseable level keeps the current filter and logs a warning.
    pub fn apply_configured(&self, level: &str) -> Result<()> {
        if self.from_env {
            debug!("RUST_LOG is set, ignoring configured level '{}'", level);
            return Ok(());
        }

        match EnvFilter::try_new(level) {
            Ok(filter) => self
                .handle
                .reload(filter)
                .context("Failed to apply configured log level"),
            Err(e) => {
                warn!("Invalid log level '{}' in config: {}", level, e);
                Ok(())
            }
        }
    }
}

/// Install the global stderr subscriber
pub fn init() -> LogLevel {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (
            EnvFilter::new(CompiledDefaults::for_current_platform().log_level),
            false,
        ),
    };
    let (subscriber, level) = build(filter, from_env, std::io::stderr);
    subscriber.init();
    level
}

fn build<W>(
    filter: EnvFilter,
    from_env: bool,
    make_writer: W,
) -> (impl Subscriber + Send + Sync + 'static, LogLevel)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer));
    (subscriber, LogLevel { handle, from_env })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use revguess_common::config::ConfigResolver;
    use tempfile::TempDir;
    use tracing::info;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(
        filter: &str,
        from_env: bool,
    ) -> (impl Subscriber + Send + Sync + 'static, LogLevel, Captured) {
        let captured = Captured::default();
        let writer = captured.clone();
        let (subscriber, level) = build(EnvFilter::new(filter), from_env, move || writer.clone());
        (subscriber, level, captured)
    }

    #[test]
    fn test_config_loading_is_logged_then_level_applied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

        let (subscriber, level, captured) = capture("info", false);
        tracing::subscriber::with_default(subscriber, || {
            let (config, _) = ConfigResolver::new(Some(path.clone())).load().unwrap();
            level.apply_configured(&config.logging.level).unwrap();
            info!("hidden after switch");
            warn!("shown after switch");
        });

        let output = captured.text();
        assert!(output.contains("Loaded configuration from"));
        assert!(!output.contains("hidden after switch"));
        assert!(output.contains("shown after switch"));
    }

    #[test]
    fn test_rust_log_overrides_configured_level() {
        let (subscriber, level, captured) = capture("debug", true);
        tracing::subscriber::with_default(subscriber, || {
            level.apply_configured("error").unwrap();
            debug!("still debug");
        });

        assert!(captured.text().contains("still debug"));
    }

    #[test]
    fn test_invalid_configured_level_keeps_filter() {
        let (subscriber, level, captured) = capture("info", false);
        tracing::subscriber::with_default(subscriber, || {
            level.apply_configured("revguess=shouting").unwrap();
            info!("info survives");
        });

        let output = captured.text();
        assert!(output.contains("Invalid log level"));
        assert!(output.contains("info survives"));
    }
}
