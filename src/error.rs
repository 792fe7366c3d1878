use std::path::PathBuf;

use thiserror::Error;

/// Library error type for helper and widget operations.
///
/// None of these are fatal: the session that hit them simply skips the
/// current cycle.
#[derive(Debug, Error)]
pub enum Error {
    /// A configured data directory could not be listed.
    #[error("failed to read files in {}: {source}", path.display())]
    ScanDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A previously scanned file could not be read back.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A client asked for data before any files were known.
    #[error("{client_id} requested data when none is available")]
    NoDataAvailable { client_id: String },
}
