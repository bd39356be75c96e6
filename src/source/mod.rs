//! Where the Catalyst running configuration comes from.

use anyhow::Result;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::MigrationError;

mod ssh;

pub use ssh::SshSource;

#[derive(Debug, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceMode {
    /// Read a saved `show running-config` from disk (default)
    #[default]
    File,
    /// Log in to the switch over SSH
    Ssh,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::File => write!(f, "file"),
            SourceMode::Ssh => write!(f, "ssh"),
        }
    }
}

/// Supplies the running configuration text of the source switch.
pub trait ConfigSource {
    fn fetch_running_config(&mut self) -> Result<String>;

    /// Short human-readable origin, used in log lines and errors.
    fn describe(&self) -> String;
}

/// Configuration saved to a text file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FileSource {
    fn fetch_running_config(&mut self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| {
            MigrationError::SourceUnavailable {
                source_name: self.describe(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Configuration already held in memory.
#[derive(Debug, Clone)]
pub struct StaticText {
    label: String,
    text: String,
}

impl StaticText {
    pub fn new(label: &str, text: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            text: text.into(),
        }
    }
}

impl ConfigSource for StaticText {
    fn fetch_running_config(&mut self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_missing_file_is_transport_error() {
        let mut source = FileSource::new("/nonexistent/cat2meraki/running-config.txt");
        let err = source.fetch_running_config().unwrap_err();
        let migration_error = err
            .downcast_ref::<MigrationError>()
            .expect("typed source error");
        assert_eq!(migration_error.kind(), ErrorKind::Transport);
        assert!(err
            .to_string()
            .contains("Failed to retrieve configuration from /nonexistent/cat2meraki"));
    }

    #[test]
    fn test_static_text() {
        let mut source = StaticText::new("inline", "hostname sw1\n");
        assert_eq!(source.fetch_running_config().unwrap(), "hostname sw1\n");
        assert_eq!(source.describe(), "inline");
    }
}
