use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    InvalidLevel(String),
    InvalidConfig(String),
    BaseDirectory(std::io::Error),
    CreateDirectory { path: PathBuf, source: std::io::Error },
    OpenLogFile { path: PathBuf, source: std::io::Error },
    SpawnDispatcher(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidLevel(level) => write!(
                f,
                "incorrect log-level {:?}, possible values are: DBGRM, DEBUG, INFO, WARNING, ERROR",
                level
            ),
            Error::InvalidConfig(reason) => write!(f, "invalid logger config: {}", reason),
            Error::BaseDirectory(err) => write!(f, "cannot resolve log base directory: {}", err),
            Error::CreateDirectory { path, source } => {
                write!(f, "cannot create log directory {}: {}", path.display(), source)
            }
            Error::OpenLogFile { path, source } => {
                write!(f, "cannot open log file {}: {}", path.display(), source)
            }
            Error::SpawnDispatcher(err) => write!(f, "cannot start log dispatcher: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::BaseDirectory(err) | Error::SpawnDispatcher(err) => Some(err),
            Error::CreateDirectory { source, .. } | Error::OpenLogFile { source, .. } => Some(source),
            Error::InvalidLevel(_) | Error::InvalidConfig(_) => None,
        }
    }
}
