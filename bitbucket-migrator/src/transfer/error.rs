//! Content transfer error types.

use thiserror::Error;

/// Errors raised while mirroring repository contents.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The temporary working directory couldn't be created.
    #[error("Failed to create temp directory: {0}")]
    TempDir(#[source] std::io::Error),

    /// A command couldn't be started.
    #[error("Failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A command exited unsuccessfully.
    #[error("{command} failed ({status}): {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },
}
