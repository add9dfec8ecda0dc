//! Error types for the shell

use spidriver_core::SpiDriverError;
use thiserror::Error;

/// Errors that can occur in the shell
#[derive(Error, Debug)]
pub enum ShellError {
    /// I/O error (reading/writing stdin/stdout or files)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line editor failure
    #[error("Line editor error: {0}")]
    Readline(String),

    /// Device operation error
    #[error("{0}")]
    Device(#[from] SpiDriverError),

    /// Command used before `connect`
    #[error("Not connected to device")]
    NotConnected,

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
