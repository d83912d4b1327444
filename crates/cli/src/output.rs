//! Output artifact destination
//!
//! Every render fully replaces the artifact: truncate, then write from the
//! start. The two steps are separate, so a reader can observe an empty or
//! partially written file while a write is in progress.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tally_core::{Result, TallyError};

/// Destination the pipeline driver owns exclusively
pub trait Sink: Send {
    /// Drop the current contents
    fn truncate(&mut self) -> Result<()>;

    /// Write `bytes` starting at offset zero
    fn write_from_start(&mut self, bytes: &[u8]) -> Result<()>;

    /// Human-readable destination for log lines
    fn describe(&self) -> String;

    /// Truncate, then write
    fn replace(&mut self, bytes: &[u8]) -> Result<()> {
        self.truncate()?;
        self.write_from_start(bytes)
    }
}

/// Standard output or a regular file
pub enum Output {
    Stdout,
    File { path: PathBuf, file: File },
}

impl Output {
    /// Open the destination; `None` means stdout
    ///
    /// The file is created (or truncated) immediately so configuration
    /// mistakes surface before the first render.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Output::Stdout);
        };

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| TallyError::sink(path.display().to_string(), e))?;

        Ok(Output::File {
            path: path.to_path_buf(),
            file,
        })
    }
}

impl Sink for Output {
    fn truncate(&mut self) -> Result<()> {
        match self {
            // Nothing to take back once it is on stdout
            Output::Stdout => Ok(()),
            Output::File { path, file } => file
                .set_len(0)
                .map_err(|e| TallyError::sink(path.display().to_string(), e)),
        }
    }

    fn write_from_start(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(bytes)
                    .and_then(|_| stdout.flush())
                    .map_err(|e| TallyError::sink("stdout", e))
            }
            Output::File { path, file } => file
                .seek(SeekFrom::Start(0))
                .and_then(|_| file.write_all(bytes))
                .and_then(|_| file.flush())
                .map_err(|e| TallyError::sink(path.display().to_string(), e)),
        }
    }

    fn describe(&self) -> String {
        match self {
            Output::Stdout => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }
}
