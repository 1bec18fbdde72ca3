use crate::error::Error;

pub const COLOR_RESET: &str = "\x1b[0m";

#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum Level {
    Dbgrm,
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Dbgrm,
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
    ];

    /// Looks up a message level by its exact (case-sensitive) name.
    pub fn resolve(name: &str) -> Option<Level> {
        match name {
            "DBGRM" => Some(Level::Dbgrm),
            "DEBUG" => Some(Level::Debug),
            "INFO" => Some(Level::Info),
            "WARNING" => Some(Level::Warning),
            "ERROR" => Some(Level::Error),
            _ => None,
        }
    }

    /// Parses a configured threshold. Unlike [`Level::resolve`] this trims
    /// and ignores case, since it comes from config files and env vars.
    pub fn from_config(name: &str) -> Result<Level, Error> {
        Level::resolve(&name.trim().to_uppercase())
            .ok_or_else(|| Error::InvalidLevel(name.to_string()))
    }

    pub fn weight(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Dbgrm => "DBGRM",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Level::Dbgrm => "\x1b[1;35m",   // magenta
            Level::Debug => "\x1b[1;34m",   // blue
            Level::Info => "\x1b[1;32m",    // green
            Level::Warning => "\x1b[1;33m", // yellow
            Level::Error => "\x1b[1;31m",   // red
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a configured threshold filters message levels.
///
/// `Legacy` keeps the historical behaviour where a `DEBUG` threshold
/// (weight 1) lets everything through, `DBGRM` included. `Strict` is a plain
/// weight comparison.
#[derive(Debug, Default, Eq, PartialEq, Clone, Copy)]
pub enum AdmissionPolicy {
    #[default]
    Legacy,
    Strict,
}

impl AdmissionPolicy {
    pub fn admits(self, threshold: Level, level: Level) -> bool {
        if level.weight() >= threshold.weight() {
            return true;
        }
        self == AdmissionPolicy::Legacy && threshold.weight() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_case_sensitive() {
        assert_eq!(Level::resolve("INFO"), Some(Level::Info));
        assert_eq!(Level::resolve("info"), None);
        assert_eq!(Level::resolve("TRACE"), None);
    }

    #[test]
    fn from_config_trims_and_ignores_case() {
        assert_eq!(Level::from_config("  warning ").unwrap(), Level::Warning);
        assert_eq!(Level::from_config("dbgrm").unwrap(), Level::Dbgrm);
        assert!(matches!(Level::from_config(""), Err(Error::InvalidLevel(_))));
        assert!(matches!(Level::from_config("verbose"), Err(Error::InvalidLevel(_))));
    }

    #[test]
    fn weights_are_monotonic() {
        let weights: Vec<u8> = Level::ALL.iter().map(|l| l.weight()).collect();
        assert_eq!(weights, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn strict_admission_compares_weights() {
        for threshold in Level::ALL {
            for level in Level::ALL {
                assert_eq!(
                    AdmissionPolicy::Strict.admits(threshold, level),
                    level.weight() >= threshold.weight(),
                    "threshold {threshold} level {level}"
                );
            }
        }
    }

    #[test]
    fn legacy_debug_threshold_admits_everything() {
        for level in Level::ALL {
            assert!(AdmissionPolicy::Legacy.admits(Level::Debug, level));
        }
        assert!(!AdmissionPolicy::Strict.admits(Level::Debug, Level::Dbgrm));
    }

    #[test]
    fn legacy_matches_strict_for_other_thresholds() {
        for threshold in [Level::Dbgrm, Level::Info, Level::Warning, Level::Error] {
            for level in Level::ALL {
                assert_eq!(
                    AdmissionPolicy::Legacy.admits(threshold, level),
                    AdmissionPolicy::Strict.admits(threshold, level)
                );
            }
        }
    }
}
