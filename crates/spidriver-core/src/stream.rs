//! `std::io` adapter over the SPI bus

use crate::device::Device;
use crate::transport::Transport;
use std::io;

/// Byte stream that reads from and writes to the SPI bus
///
/// Reads clock out zeros; writes discard whatever the target returns. Seeking
/// is not supported.
pub struct DataStream<T: Transport> {
    device: Device<T>,
}

impl<T: Transport> DataStream<T> {
    /// Wrap a device handle
    pub fn new(device: Device<T>) -> Self {
        Self { device }
    }
}

impl<T: Transport> io::Read for DataStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.device.read(buf)?)
    }
}

impl<T: Transport> io::Write for DataStream<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.device.write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.device.flush()?)
    }
}
