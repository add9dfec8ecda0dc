//! Error types for SPI bridge operations

use thiserror::Error;

/// Errors reported by the SPI bridge driver
#[derive(Debug, Error)]
pub enum SpiDriverError {
    /// Operation attempted while the transport is closed
    #[error("The serial port is not open")]
    NotConnected,

    /// The device answered with something we did not expect
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O failure on the underlying transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// A read or write exceeded the configured transport timeout
    #[error("Communication timeout")]
    Timeout,

    /// Invalid parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Background task running a blocking operation failed
    #[error("Background task failed: {0}")]
    Task(String),
}

impl SpiDriverError {
    /// True for errors raised by the transport itself (I/O failure or timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, SpiDriverError::Transport(_) | SpiDriverError::Timeout)
    }
}

/// Result type for SPI bridge operations
pub type Result<T> = core::result::Result<T, SpiDriverError>;

impl From<std::io::Error> for SpiDriverError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                SpiDriverError::Timeout
            }
            _ => SpiDriverError::Transport(e.to_string()),
        }
    }
}

impl From<serialport::Error> for SpiDriverError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::Io(std::io::ErrorKind::TimedOut) => SpiDriverError::Timeout,
            _ => SpiDriverError::Transport(e.to_string()),
        }
    }
}

impl From<SpiDriverError> for std::io::Error {
    fn from(e: SpiDriverError) -> Self {
        match e {
            SpiDriverError::Timeout => std::io::Error::new(std::io::ErrorKind::TimedOut, e),
            SpiDriverError::NotConnected => std::io::Error::new(std::io::ErrorKind::NotConnected, e),
            SpiDriverError::InvalidArgument(_) => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
            }
            _ => std::io::Error::other(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_timeout_maps_to_timeout() {
        let e = SpiDriverError::from(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"));
        assert!(matches!(e, SpiDriverError::Timeout));
        assert!(e.is_transport());
    }

    #[test]
    fn test_io_roundtrip_kind() {
        let e: std::io::Error = SpiDriverError::NotConnected.into();
        assert_eq!(e.kind(), std::io::ErrorKind::NotConnected);
        assert!(!SpiDriverError::Protocol("x".into()).is_transport());
    }
}
