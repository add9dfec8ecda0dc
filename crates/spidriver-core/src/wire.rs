//! Exact-length reads over a transport that delivers data in bursts

use crate::error::{Result, SpiDriverError};
use crate::transport::Transport;

/// Fill `buf` completely from `transport`
///
/// Keeps calling [`Transport::read`] until every byte has arrived. Transport
/// errors (including timeouts) abort the read; a zero-length read is treated
/// as the stream ending.
pub fn read_exact<T: Transport + ?Sized>(transport: &mut T, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = transport.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(SpiDriverError::Transport(format!(
                "unexpected end of stream after {} of {} bytes",
                filled,
                buf.len()
            )));
        }
        filled += n;
        log::trace!("wire: read {} bytes ({}/{})", n, filled, buf.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Transport that hands out at most `burst` bytes per read
    struct Trickle {
        data: VecDeque<u8>,
        burst: usize,
        reads: usize,
    }

    impl Trickle {
        fn new(data: &[u8], burst: usize) -> Self {
            Self {
                data: data.iter().copied().collect(),
                burst,
                reads: 0,
            }
        }
    }

    impl Transport for Trickle {
        fn open(&mut self) -> Result<()> {
            Ok(())
        }
        fn close(&mut self) {}
        fn is_open(&self) -> bool {
            true
        }
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            self.reads += 1;
            if self.data.is_empty() {
                return Err(SpiDriverError::Timeout);
            }
            let n = buf.len().min(self.burst).min(self.data.len());
            for slot in &mut buf[..n] {
                *slot = self.data.pop_front().unwrap();
            }
            Ok(n)
        }
        fn write(&mut self, _data: &[u8]) -> Result<()> {
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn read_timeout(&self) -> Option<Duration> {
            None
        }
        fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> Result<()> {
            Ok(())
        }
        fn write_timeout(&self) -> Option<Duration> {
            None
        }
        fn set_write_timeout(&mut self, _timeout: Option<Duration>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_one_byte_per_read() {
        let mut t = Trickle::new(&[1, 2, 3, 4, 5], 1);
        let mut buf = [0u8; 5];
        read_exact(&mut t, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5]);
        assert_eq!(t.reads, 5);
    }

    #[test]
    fn test_uneven_bursts() {
        let data: Vec<u8> = (0..100).collect();
        let mut t = Trickle::new(&data, 7);
        let mut buf = [0u8; 100];
        read_exact(&mut t, &mut buf).unwrap();
        assert_eq!(&buf[..], &data[..]);
        assert_eq!(t.reads, 15);
    }

    #[test]
    fn test_short_data_times_out() {
        let mut t = Trickle::new(&[1, 2], 4);
        let mut buf = [0u8; 3];
        assert!(matches!(
            read_exact(&mut t, &mut buf),
            Err(SpiDriverError::Timeout)
        ));
    }

    #[test]
    fn test_empty_buffer_reads_nothing() {
        let mut t = Trickle::new(&[], 1);
        read_exact(&mut t, &mut []).unwrap();
        assert_eq!(t.reads, 0);
    }
}
