//! Log sinks for the fmt layer.
//!
//! The catalog browser owns stdout in raw mode, so `browse` appends to a log
//! file in the data directory instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Where formatted log lines go.
pub struct LogSink {
    /// Writer handed to the fmt layer.
    pub writer: BoxMakeWriter,
    /// Emit ANSI colours (terminal only).
    pub ansi: bool,
}

impl LogSink {
    /// Logs to stdout.
    pub fn stdout() -> Self {
        Self {
            writer: BoxMakeWriter::new(std::io::stdout),
            ansi: true,
        }
    }

    /// Appends to `path`, creating the file and its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        Ok(Self {
            writer: BoxMakeWriter::new(Mutex::new(file)),
            ansi: false,
        })
    }
}
