use std::path::PathBuf;

use crate::error::Error;
use crate::level::AdmissionPolicy;

pub const LOG_DIR_NAME: &str = "logs";
pub const LOG_FILE_NAME_PREFIX: &str = "server.log";
pub const DEFAULT_LOG_LEVEL: &str = "DEBUG";
pub const DEFAULT_FILE_SIZE_LIMIT: u64 = 20 * 1024 * 1024; // 20 MiB
pub const DEFAULT_MAX_FILES: usize = 10;
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Settings handed to the logger once, at start-up.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Directory under which `logs/` is created. `None` (or an empty path)
    /// means the directory holding the running executable.
    pub base_dir: Option<PathBuf>,
    pub level: String,
    /// `false` sends every record to stdout instead of the ring files.
    pub file_backed: bool,
    /// Point the process's stdout/stderr at the active log file.
    pub redirect_std_streams: bool,
    pub file_size_limit: u64,
    pub max_files: usize,
    pub queue_capacity: usize,
    pub admission: AdmissionPolicy,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            base_dir: None,
            level: DEFAULT_LOG_LEVEL.to_string(),
            file_backed: true,
            redirect_std_streams: false,
            file_size_limit: DEFAULT_FILE_SIZE_LIMIT,
            max_files: DEFAULT_MAX_FILES,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            admission: AdmissionPolicy::default(),
        }
    }
}

impl LoggerConfig {
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_file_backed(mut self, file_backed: bool) -> Self {
        self.file_backed = file_backed;
        self
    }

    pub fn with_redirect_std_streams(mut self, redirect: bool) -> Self {
        self.redirect_std_streams = redirect;
        self
    }

    pub fn with_file_size_limit(mut self, bytes: u64) -> Self {
        self.file_size_limit = bytes;
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_admission(mut self, admission: AdmissionPolicy) -> Self {
        self.admission = admission;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_files == 0 {
            return Err(Error::InvalidConfig("max_files must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig("queue_capacity must be at least 1".into()));
        }
        if self.file_size_limit == 0 {
            return Err(Error::InvalidConfig("file_size_limit must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_ring_layout() {
        let config = LoggerConfig::default();
        assert_eq!(config.file_size_limit, 20971520);
        assert_eq!(config.max_files, 10);
        assert_eq!(config.queue_capacity, 10);
        assert!(config.file_backed);
        assert!(!config.redirect_std_streams);
        assert_eq!(config.admission, AdmissionPolicy::Legacy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_ring_and_queue() {
        assert!(LoggerConfig::default().with_max_files(0).validate().is_err());
        assert!(LoggerConfig::default().with_queue_capacity(0).validate().is_err());
        assert!(LoggerConfig::default().with_file_size_limit(0).validate().is_err());
    }
}
