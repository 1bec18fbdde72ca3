//! Size-triggered rotation over a fixed ring of log files.
//!
//! The ring is `server.log.1 ..= server.log.<max_files>`. Slot 1 is always
//! the file being appended to. When it reaches the size limit it is moved
//! aside to `server.log.1.dummy`, a fresh slot 1 is opened, every older file
//! moves one slot back (the last slot's content falls off the end) and the
//! dummy becomes slot 2.
//!
//! All of this runs on the dispatcher thread, so the shift has finished
//! before the next size check and no locking is involved.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::LOG_FILE_NAME_PREFIX;
use crate::error::Error;
use crate::redirect::redirect_std_streams;
use crate::targets::LogTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    /// Number of ring slots in use, in `1..=file_paths.len()`.
    pub current_file_index: usize,
    pub current_file_size: u64,
    pub file_paths: Vec<PathBuf>,
    pub dummy_path: PathBuf,
}

impl RotationState {
    pub fn new(log_dir: &Path, max_files: usize) -> Self {
        let file_paths = (1..=max_files)
            .map(|n| log_dir.join(format!("{}.{}", LOG_FILE_NAME_PREFIX, n)))
            .collect();
        RotationState {
            current_file_index: 1,
            current_file_size: 0,
            file_paths,
            dummy_path: log_dir.join(format!("{}.1.dummy", LOG_FILE_NAME_PREFIX)),
        }
    }

    /// Counts the slots already holding history from an earlier run, so the
    /// first rotation after a restart shifts them instead of clobbering slot 2.
    fn recover_index(&mut self) {
        self.current_file_index = self
            .file_paths
            .iter()
            .rposition(|path| path.exists())
            .map_or(1, |last| last + 1);
    }

    pub fn current_path(&self) -> &Path {
        &self.file_paths[0]
    }
}

pub struct RotatingFileTarget {
    file: Option<File>,
    state: RotationState,
    size_limit: u64,
    redirect_std_streams: bool,
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
}

fn rename(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("mv {} to {}: {}", from.display(), to.display(), err),
        )
    })
}

impl RotatingFileTarget {
    /// Opens (or creates) slot 1 inside an existing `log_dir`.
    pub fn open(
        log_dir: &Path,
        max_files: usize,
        size_limit: u64,
        redirect_std: bool,
    ) -> Result<Self, Error> {
        let mut state = RotationState::new(log_dir, max_files);
        let file = open_append(state.current_path()).map_err(|source| Error::OpenLogFile {
            path: state.current_path().to_path_buf(),
            source,
        })?;
        state.current_file_size = file.metadata().map(|meta| meta.len()).unwrap_or(0);
        state.recover_index();

        let target = RotatingFileTarget {
            file: Some(file),
            state,
            size_limit,
            redirect_std_streams: redirect_std,
        };
        target.redirect();
        Ok(target)
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    fn redirect(&self) {
        if !self.redirect_std_streams {
            return;
        }
        if let Some(file) = &self.file {
            if let Err(err) = redirect_std_streams(file) {
                eprintln!("ring_logger: failed to redirect stdout/stderr: {}", err);
            }
        }
    }

    /// Appends `text` to slot 1 and rotates once it has reached the limit.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(file) = self.file.as_mut() else {
            eprintln!("ring_logger: log file handle lost, terminating");
            std::process::exit(1);
        };

        if let Err(err) = file.write_all(text.as_bytes()) {
            eprintln!("ring_logger: failed to write log file: {}", err);
        }
        match file.metadata() {
            Ok(meta) => self.state.current_file_size = meta.len(),
            Err(err) => {
                eprintln!("ring_logger: failed to stat log file: {}", err);
                return;
            }
        }

        if self.state.current_file_size >= self.size_limit {
            self.rotate();
        }
    }

    fn rotate(&mut self) {
        drop(self.file.take());
        let current = self.state.current_path().to_path_buf();

        if let Err(err) = rename(&current, &self.state.dummy_path) {
            eprintln!("ring_logger: {}", err);
            self.reopen(&current);
            return;
        }
        if !self.reopen(&current) {
            return;
        }
        self.state.current_file_size = 0;
        if self.state.current_file_index < self.state.file_paths.len() {
            self.state.current_file_index += 1;
        }

        if let Err(err) = self.shift() {
            eprintln!("ring_logger: {}", err);
        }
    }

    fn reopen(&mut self, path: &Path) -> bool {
        match open_append(path) {
            Ok(file) => {
                self.state.current_file_size = file.metadata().map(|meta| meta.len()).unwrap_or(0);
                self.file = Some(file);
                self.redirect();
                true
            }
            Err(err) => {
                eprintln!("ring_logger: failed to recreate {}: {}", path.display(), err);
                false
            }
        }
    }

    /// Moves slot `i-1` to slot `i` from the highest used slot downwards, then
    /// the dummy into slot 2. A missing source slot (a gap left by an earlier
    /// run) is skipped; any other failed rename abandons the shift.
    fn shift(&self) -> io::Result<()> {
        let paths = &self.state.file_paths;
        for i in (3..=self.state.current_file_index).rev() {
            match rename(&paths[i - 2], &paths[i - 1]) {
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                result => result?,
            }
        }
        match paths.get(1) {
            Some(second) => rename(&self.state.dummy_path, second),
            None => fs::remove_file(&self.state.dummy_path),
        }
    }
}

impl LogTarget for RotatingFileTarget {
    fn log(&mut self, message: &str) {
        self.append(message);
    }
}
