//! spidriver-core - Host driver for serial-to-SPI bridge gadgets
//!
//! This crate talks to a small gadget that bridges a serial port to an SPI
//! bus, with a chip-select line and two auxiliary outputs (A and B).
//!
//! # Protocol Overview
//!
//! The host sends short binary commands. Bulk transfers are split into
//! chunks of at most 64 bytes, each preceded by a header byte that encodes
//! the direction and `length - 1`. Read and read-write chunks are answered
//! with exactly as many bytes as were clocked out; everything else is
//! fire-and-forget except the echo probe and the 80-byte status line.
//!
//! # Example
//!
//! ```no_run
//! use spidriver_core::{Device, Output, SerialConfig};
//!
//! let device = Device::open_serial(SerialConfig::parse("/dev/ttyUSB0")?);
//! device.connect()?;
//!
//! device.set_output(Output::ChipSelect, true)?;
//! device.write(&[0x9F])?;
//! let mut id = [0u8; 3];
//! device.read(&mut id)?;
//! device.set_output(Output::ChipSelect, false)?;
//!
//! println!("{}", device.status()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod device;
#[cfg(feature = "dummy")]
pub mod dummy;
pub mod error;
pub mod output;
pub mod protocol;
pub mod status;
pub mod stream;
pub mod transport;
pub mod wire;

// Re-exports
pub use device::Device;
pub use error::{Result, SpiDriverError};
pub use output::Output;
pub use status::DeviceStatus;
pub use stream::DataStream;
pub use transport::serial::SerialTransport;
pub use transport::{SerialConfig, Transport};

#[cfg(feature = "dummy")]
pub use dummy::{DummyConfig, DummyTransport};

/// Type-erased transport, for callers that pick the backend at runtime
pub type BoxedTransport = Box<dyn Transport>;

/// Device over a type-erased transport
pub type BoxedDevice = Device<BoxedTransport>;

/// Name accepted by [`open_device`] for the in-memory emulator
#[cfg(feature = "dummy")]
pub const DUMMY_PORT: &str = "dummy";

/// Create an unconnected device for a port string
///
/// `port` is a serial connection string as understood by
/// [`SerialConfig::parse`], or `dummy` for the in-memory emulator. Both
/// timeouts are set to `timeout`. Call [`Device::connect`] next.
pub fn open_device(port: &str, timeout: Option<std::time::Duration>) -> Result<BoxedDevice> {
    #[cfg(feature = "dummy")]
    if port == DUMMY_PORT {
        let mut dummy = DummyTransport::new_default();
        dummy.set_read_timeout(timeout)?;
        dummy.set_write_timeout(timeout)?;
        return Ok(Device::new(Box::new(dummy)));
    }

    let config = SerialConfig::parse(port)?.with_timeout(timeout);
    log::debug!("spidriver: Using serial port {} at {} baud", config.path, config.baud);
    Ok(Device::new(Box::new(SerialTransport::new(config))))
}
