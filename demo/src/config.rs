use std::env;
use std::path::PathBuf;

use ring_logger::LoggerConfig;

pub struct Config {
    pub logger: LoggerConfig,
    pub producers: usize,
    pub messages_per_producer: usize,
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        let defaults = LoggerConfig::default();

        let base_dir = env::var("RING_LOG_DIR")
            .ok()
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let logger = LoggerConfig {
            base_dir,
            level: env::var("RING_LOG_LEVEL").unwrap_or(defaults.level),
            file_backed: env_flag("RING_LOG_TO_FILE", defaults.file_backed),
            redirect_std_streams: env_flag("RING_LOG_REDIRECT", defaults.redirect_std_streams),
            file_size_limit: env_number("RING_LOG_FILE_SIZE", defaults.file_size_limit),
            max_files: env_number("RING_LOG_MAX_FILES", defaults.max_files),
            ..defaults
        };

        Self {
            logger,
            producers: env_number("DEMO_PRODUCERS", 4),
            messages_per_producer: env_number("DEMO_MESSAGES", 1000),
        }
    }
}
