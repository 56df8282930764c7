//! Error types for bletrace-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scanning or exporting.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// No Bluetooth adapter available on this host.
    #[error("no Bluetooth adapter available")]
    NoAdapter,

    /// The scan backend could not be started. Fatal to the session; no
    /// registry is produced when this is returned.
    #[error("failed to start scan: {reason}")]
    ScanStartFailed {
        /// Backend-reported reason.
        reason: String,
    },

    /// Writing the export file failed. A previously successful export at
    /// the same path is left intact.
    #[error("failed to export registry to {path}: {reason}")]
    ExportFailed {
        /// Destination the export was headed for.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// An export file could not be parsed back into a registry.
    #[error("invalid export data: {0}")]
    InvalidData(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a scan start failure.
    pub fn scan_start_failed(reason: impl Into<String>) -> Self {
        Self::ScanStartFailed {
            reason: reason.into(),
        }
    }

    /// Create an export failure for a destination path.
    pub fn export_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ExportFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias using bletrace-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::scan_start_failed("adapter powered off");
        assert_eq!(
            err.to_string(),
            "failed to start scan: adapter powered off"
        );

        let err = Error::export_failed("/tmp/out.json", "disk full");
        assert!(err.to_string().contains("/tmp/out.json"));
        assert!(err.to_string().contains("disk full"));

        let err = Error::NoAdapter;
        assert_eq!(err.to_string(), "no Bluetooth adapter available");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
