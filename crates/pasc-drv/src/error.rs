//! Driver error types.

use std::path::PathBuf;

use thiserror::Error;

use pasc_util::Diagnostic;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Everything that can stop an invocation, split by exit status.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Reading the input or writing the output failed.
    #[error("{}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A phase rejected the program.
    #[error(transparent)]
    Compile(#[from] Diagnostic),
}

impl DriverError {
    /// Process exit status: compilation failures exit 1, I/O failures 2.
    /// (Bad command lines also exit 2, via clap.)
    pub fn exit_code(&self) -> u8 {
        match self {
            DriverError::Compile(_) => 1,
            DriverError::Io { .. } => 2,
        }
    }
}
