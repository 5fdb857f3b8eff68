use std::env;
use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

pub const LOG_ENV: &str = "FOLIO_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

pub fn log_path(config: &LogConfig) -> Option<PathBuf> {
    config
        .file
        .clone()
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("folio").join("folio.log")))
}

fn filter_directive(from_env: Option<String>, configured: &str) -> String {
    from_env
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| Some(configured.trim().to_string()).filter(|value| !value.is_empty()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Installs the global subscriber. The terminal belongs to the UI, so events
/// only go to the log file. Keep the guard alive until exit.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let directive = filter_directive(env::var(LOG_ENV).ok(), &config.level);
    let env_filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let path = log_path(config)?;
    let dir = path.parent()?.to_path_buf();
    let file_name = path.file_name()?.to_os_string();
    if let Err(err) = fs::create_dir_all(&dir) {
        eprintln!("log directory {} unavailable: {err}", dir.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_target(true);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    Some(file_guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directive_wins() {
        assert_eq!(
            filter_directive(Some("folio=debug".into()), "warn"),
            "folio=debug"
        );
        assert_eq!(filter_directive(Some("  ".into()), "warn"), "warn");
        assert_eq!(filter_directive(None, ""), "info");
    }

    #[test]
    fn configured_file_overrides_cache_dir() {
        let config = LogConfig {
            level: "info".into(),
            file: Some(PathBuf::from("/tmp/folio-test.log")),
        };
        assert_eq!(log_path(&config), Some(PathBuf::from("/tmp/folio-test.log")));

        let config = LogConfig {
            level: "info".into(),
            file: None,
        };
        if let Some(path) = log_path(&config) {
            assert!(path.ends_with("folio/folio.log"));
        }
    }
}
