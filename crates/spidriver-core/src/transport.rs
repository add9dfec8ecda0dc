//! Transport layer abstraction for the bridge link
//!
//! The gadget is reached over a byte-oriented duplex channel. Reads may
//! return fewer bytes than requested; use [`crate::wire::read_exact`] when a
//! fixed-size response is expected.

use crate::error::{Result, SpiDriverError};
use std::time::Duration;

/// Duplex byte channel to the gadget
pub trait Transport: Send {
    /// Open the channel. Opening an open channel is a no-op.
    fn open(&mut self) -> Result<()>;

    /// Close the channel. Closing a closed channel is a no-op.
    fn close(&mut self);

    /// Whether the channel is open
    fn is_open(&self) -> bool;

    /// Read up to `buf.len()` bytes, blocking until at least one arrives
    ///
    /// Returns the number of bytes read. Fails with
    /// [`SpiDriverError::Timeout`] once the read timeout elapses.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<()>;

    /// Current read timeout (`None` blocks forever)
    fn read_timeout(&self) -> Option<Duration>;

    /// Set the read timeout
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Current write timeout (`None` blocks forever)
    fn write_timeout(&self) -> Option<Duration>;

    /// Set the write timeout
    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn read_timeout(&self) -> Option<Duration> {
        (**self).read_timeout()
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        (**self).set_read_timeout(timeout)
    }

    fn write_timeout(&self) -> Option<Duration> {
        (**self).write_timeout()
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        (**self).set_write_timeout(timeout)
    }
}

/// Serial port settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path (e.g., "/dev/ttyUSB0" or "COM1")
    pub path: String,
    /// Baud rate
    pub baud: u32,
    /// Read timeout, `None` for unbounded
    pub read_timeout: Option<Duration>,
    /// Write timeout, `None` for unbounded
    pub write_timeout: Option<Duration>,
}

impl SerialConfig {
    /// Settings for `path` at the gadget's default baud rate
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud: crate::protocol::DEFAULT_BAUD,
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// Parse a connection string
    ///
    /// Formats:
    /// - `/dev/ttyUSB0` - default baud
    /// - `/dev/ttyUSB0:115200` - specified baud
    /// - `dev=/dev/ttyUSB0[:BAUD]` - same, with an explicit prefix
    pub fn parse(s: &str) -> Result<Self> {
        let dev = s.strip_prefix("dev=").unwrap_or(s);
        if dev.is_empty() {
            return Err(SpiDriverError::InvalidArgument(
                "empty serial port name".into(),
            ));
        }

        // Only an all-digit suffix is a baud rate; by-path names contain ':'
        match dev.rsplit_once(':') {
            Some((path, baud_str))
                if !path.is_empty()
                    && !baud_str.is_empty()
                    && baud_str.bytes().all(|b| b.is_ascii_digit()) =>
            {
                let baud = baud_str.parse().map_err(|_| {
                    SpiDriverError::InvalidArgument(format!("Invalid baud rate: {}", baud_str))
                })?;
                Ok(Self {
                    baud,
                    ..Self::new(path)
                })
            }
            _ => Ok(Self::new(dev)),
        }
    }

    /// Set both timeouts
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self.write_timeout = timeout;
        self
    }
}

pub mod serial {
    //! Serial port transport implementation

    use super::*;
    use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
    use std::io::{Read, Write};

    /// Poll interval used to emulate an unbounded timeout
    const POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Serial port transport
    ///
    /// Created closed; [`Transport::open`] opens the port at 8N1 with no flow
    /// control.
    pub struct SerialTransport {
        config: SerialConfig,
        port: Option<Box<dyn SerialPort>>,
    }

    impl SerialTransport {
        /// Create an unopened transport
        pub fn new(config: SerialConfig) -> Self {
            Self { config, port: None }
        }

        fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
            self.port.as_mut().ok_or(SpiDriverError::NotConnected)
        }

        /// Apply `timeout` to the port, substituting the poll interval for
        /// an unbounded one
        fn arm(&mut self, timeout: Option<Duration>) -> Result<()> {
            let port = self.port()?;
            let wanted = timeout.unwrap_or(POLL_INTERVAL);
            if port.timeout() != wanted {
                port.set_timeout(wanted)?;
            }
            Ok(())
        }
    }

    impl Transport for SerialTransport {
        fn open(&mut self) -> Result<()> {
            if self.port.is_some() {
                return Ok(());
            }

            let port = serialport::new(&self.config.path, self.config.baud)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None)
                .timeout(self.config.read_timeout.unwrap_or(POLL_INTERVAL))
                .open()?;

            log::info!(
                "Opened serial port {} at {} baud",
                self.config.path,
                self.config.baud
            );

            self.port = Some(port);
            Ok(())
        }

        fn close(&mut self) {
            if self.port.take().is_some() {
                log::info!("Closed serial port {}", self.config.path);
            }
        }

        fn is_open(&self) -> bool {
            self.port.is_some()
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let timeout = self.config.read_timeout;
            self.arm(timeout)?;
            let port = self.port()?;
            loop {
                match port.read(buf) {
                    Ok(n) => return Ok(n),
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut && timeout.is_none() => {
                        continue
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        fn write(&mut self, data: &[u8]) -> Result<()> {
            let timeout = self.config.write_timeout;
            self.arm(timeout)?;
            let port = self.port()?;
            let mut written = 0;
            while written < data.len() {
                match port.write(&data[written..]) {
                    Ok(0) => {
                        return Err(SpiDriverError::Transport(
                            "serial port accepted no data".into(),
                        ))
                    }
                    Ok(n) => written += n,
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut && timeout.is_none() => {
                        continue
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.port()?.flush()?;
            Ok(())
        }

        fn read_timeout(&self) -> Option<Duration> {
            self.config.read_timeout
        }

        fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
            self.config.read_timeout = timeout;
            Ok(())
        }

        fn write_timeout(&self) -> Option<Duration> {
            self.config.write_timeout
        }

        fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
            self.config.write_timeout = timeout;
            Ok(())
        }
    }
}
