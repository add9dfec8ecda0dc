//! Bridge device implementation
//!
//! [`Device`] is a cheaply cloneable handle to one gadget. All clones share
//! a single lock around the transport, and every bus transaction (connection
//! test, status query, output change, bulk transfer) holds that lock from its
//! first write to its last read. Bytes from two transactions never interleave
//! on the wire.
//!
//! Each operation is implemented once, blocking. With the `async` feature the
//! `*_async` variants run the same code on tokio's blocking pool, so sync and
//! async callers contend for the same lock.

use crate::error::{Result, SpiDriverError};
use crate::output::Output;
use crate::protocol::{self, Chunks, Command, Frame};
use crate::status::DeviceStatus;
use crate::stream::DataStream;
use crate::transport::serial::SerialTransport;
use crate::transport::{SerialConfig, Transport};
use crate::wire::read_exact;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Handle to a serial-to-SPI bridge
pub struct Device<T: Transport> {
    link: Arc<Mutex<T>>,
}

impl<T: Transport> Clone for Device<T> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

impl Device<SerialTransport> {
    /// Create a device bound to a serial port; the port is not opened yet
    pub fn open_serial(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config))
    }
}

impl<T: Transport> Device<T> {
    /// Wrap a transport. Call [`Device::connect`] before anything else.
    pub fn new(transport: T) -> Self {
        Self {
            link: Arc::new(Mutex::new(transport)),
        }
    }

    /// Take the bus lock
    ///
    /// A panic while the lock was held leaves the gadget in an unknown state,
    /// the same as any other failed transaction, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, T> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the bus lock, failing if the transport is closed
    fn lock_open(&self) -> Result<MutexGuard<'_, T>> {
        let link = self.lock();
        if !link.is_open() {
            return Err(SpiDriverError::NotConnected);
        }
        Ok(link)
    }

    /// Whether the transport is open
    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    /// Close the transport
    pub fn close(&self) {
        self.lock().close();
        log::debug!("spidriver: Closed");
    }

    /// Current read timeout
    pub fn read_timeout(&self) -> Option<Duration> {
        self.lock().read_timeout()
    }

    /// Set the read timeout (`None` waits forever)
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.lock().set_read_timeout(timeout)
    }

    /// Current write timeout
    pub fn write_timeout(&self) -> Option<Duration> {
        self.lock().write_timeout()
    }

    /// Set the write timeout (`None` waits forever)
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.lock().set_write_timeout(timeout)
    }

    /// Open the transport if needed and run the connection test
    ///
    /// Sends the priming sequence, then asks the gadget to echo each of
    /// [`protocol::ECHO_PROBES`]. The first wrong echo fails with
    /// [`SpiDriverError::Protocol`]; the transport stays open so the caller
    /// can simply try again.
    pub fn connect(&self) -> Result<()> {
        let mut link = self.lock();
        if !link.is_open() {
            link.open()?;
        }

        link.write(&[protocol::PRIME_BYTE; protocol::PRIME_LEN])?;
        log::debug!("spidriver: Sent {} priming bytes", protocol::PRIME_LEN);

        for probe in protocol::ECHO_PROBES {
            let mut echo = [0u8];
            query(&mut *link, Command::Echo(probe), &mut echo)?;
            if echo[0] != probe {
                log::debug!(
                    "spidriver: Echo mismatch, sent 0x{:02X} got 0x{:02X}",
                    probe,
                    echo[0]
                );
                return Err(SpiDriverError::Protocol(
                    "response invalid during connection test".into(),
                ));
            }
        }

        log::info!("spidriver: Connection test passed");
        Ok(())
    }

    /// Query the gadget status
    pub fn status(&self) -> Result<DeviceStatus> {
        let mut raw = [0u8; protocol::STATUS_LEN];
        let mut link = self.lock_open()?;
        query(&mut *link, Command::Status, &mut raw)?;
        drop(link);

        let status = DeviceStatus::parse(&raw)?;
        log::trace!("spidriver: Status {:?}", status);
        Ok(status)
    }

    /// Read back the state of an output
    ///
    /// This performs a full status query.
    pub fn output(&self, output: Output) -> Result<bool> {
        Ok(self.status()?.output(output))
    }

    /// Drive an output
    pub fn set_output(&self, output: Output, enable: bool) -> Result<()> {
        let mut link = self.lock_open()?;
        send(&mut *link, Command::for_output(output, enable))?;
        log::debug!("spidriver: Set {} {}", output, if enable { "on" } else { "off" });
        Ok(())
    }

    /// Write `data` to the SPI bus, discarding MISO
    ///
    /// Returns the number of bytes written.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut link = self.lock_open()?;
        for range in Chunks::new(data.len()) {
            let frame = Frame::write(&data[range]);
            log::trace!("spidriver: {:?}", frame);
            link.write(frame.as_bytes())?;
        }
        Ok(data.len())
    }

    /// Fill `buf` from the SPI bus, clocking out zeros
    ///
    /// Returns the number of bytes read.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut link = self.lock_open()?;
        for range in Chunks::new(buf.len()) {
            let frame = Frame::read(range.len());
            log::trace!("spidriver: {:?}", frame);
            link.write(frame.as_bytes())?;
            read_exact(&mut *link, &mut buf[range])?;
        }
        Ok(buf.len())
    }

    /// Full-duplex transfer: clock out `tx` while filling `rx`
    ///
    /// Both buffers must have the same length. Returns the number of bytes
    /// exchanged.
    pub fn read_write(&self, rx: &mut [u8], tx: &[u8]) -> Result<usize> {
        if rx.len() != tx.len() {
            return Err(SpiDriverError::InvalidArgument(format!(
                "read buffer is {} bytes but write buffer is {}",
                rx.len(),
                tx.len()
            )));
        }
        if tx.is_empty() {
            return Ok(0);
        }
        let mut link = self.lock_open()?;
        for range in Chunks::new(tx.len()) {
            let frame = Frame::transfer(&tx[range.clone()]);
            log::trace!("spidriver: {:?}", frame);
            link.write(frame.as_bytes())?;
            read_exact(&mut *link, &mut rx[range])?;
        }
        Ok(tx.len())
    }

    /// Push any buffered bytes out to the gadget
    pub fn flush(&self) -> Result<()> {
        self.lock_open()?.flush()
    }

    /// Byte-stream view of the bus
    pub fn stream(&self) -> DataStream<T> {
        DataStream::new(self.clone())
    }
}

/// Put a short command on the wire
fn send<T: Transport + ?Sized>(link: &mut T, command: Command) -> Result<()> {
    let mut buf = [0u8; 2];
    link.write(command.encode(&mut buf))
}

/// Send a command and read its fixed-size reply into the front of `reply`
fn query<T: Transport + ?Sized>(link: &mut T, command: Command, reply: &mut [u8]) -> Result<()> {
    let len = command.response_len();
    let available = reply.len();
    let reply = reply.get_mut(..len).ok_or_else(|| {
        SpiDriverError::InvalidArgument(format!(
            "{:?} replies with {} bytes, buffer holds {}",
            command,
            len,
            available
        ))
    })?;
    send(link, command)?;
    read_exact(link, reply)
}

#[cfg(feature = "async")]
impl<T: Transport + 'static> Device<T> {
    /// Run `op` against a clone of this handle on the blocking pool
    async fn blocking<R, F>(&self, op: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(Device<T>) -> Result<R> + Send + 'static,
    {
        let device = self.clone();
        tokio::task::spawn_blocking(move || op(device))
            .await
            .map_err(|e| SpiDriverError::Task(e.to_string()))?
    }

    /// Async variant of [`Device::connect`]
    pub async fn connect_async(&self) -> Result<()> {
        self.blocking(|d| d.connect()).await
    }

    /// Async variant of [`Device::status`]
    pub async fn status_async(&self) -> Result<DeviceStatus> {
        self.blocking(|d| d.status()).await
    }

    /// Async variant of [`Device::output`]
    pub async fn output_async(&self, output: Output) -> Result<bool> {
        self.blocking(move |d| d.output(output)).await
    }

    /// Async variant of [`Device::set_output`]
    pub async fn set_output_async(&self, output: Output, enable: bool) -> Result<()> {
        self.blocking(move |d| d.set_output(output, enable)).await
    }

    /// Async variant of [`Device::write`]
    pub async fn write_async(&self, data: Vec<u8>) -> Result<usize> {
        self.blocking(move |d| d.write(&data)).await
    }

    /// Async variant of [`Device::read`], returning `count` bytes
    pub async fn read_async(&self, count: usize) -> Result<Vec<u8>> {
        self.blocking(move |d| {
            let mut buf = vec![0u8; count];
            d.read(&mut buf)?;
            Ok(buf)
        })
        .await
    }

    /// Async variant of [`Device::read_write`], returning the received bytes
    pub async fn read_write_async(&self, tx: Vec<u8>) -> Result<Vec<u8>> {
        self.blocking(move |d| {
            let mut rx = vec![0u8; tx.len()];
            d.read_write(&mut rx, &tx)?;
            Ok(rx)
        })
        .await
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::dummy::{DummyConfig, DummyTransport};
    use crate::protocol::ChunkKind;

    fn connected(config: DummyConfig) -> (Device<DummyTransport>, DummyTransport) {
        let dummy = DummyTransport::new(config);
        let device = Device::new(dummy.clone());
        device.connect().unwrap();
        dummy.clear_log();
        (device, dummy)
    }

    /// Split a wire log into whole commands, failing on anything malformed
    fn split_commands(wire: &[u8]) -> Vec<Vec<u8>> {
        let mut commands = Vec::new();
        let mut i = 0;
        while i < wire.len() {
            let len = match wire[i] {
                b'?' | b's' | b'u' => 1,
                b'a' | b'b' | b'e' => 2,
                byte => match protocol::decode_header(byte) {
                    Some((_, len)) => len + 1,
                    None => panic!("stray byte 0x{:02X} at {}", byte, i),
                },
            };
            assert!(i + len <= wire.len(), "truncated command at {}", i);
            commands.push(wire[i..i + len].to_vec());
            i += len;
        }
        commands
    }

    #[test]
    fn test_connect_handshake_bytes() {
        let dummy = DummyTransport::new_default();
        let device = Device::new(dummy.clone());
        assert!(!device.is_open());
        device.connect().unwrap();
        assert!(device.is_open());

        let mut expected = vec![b'@'; 64];
        for probe in protocol::ECHO_PROBES {
            expected.extend_from_slice(&[b'e', probe]);
        }
        assert_eq!(dummy.wire_log(), expected);
    }

    #[test]
    fn test_connect_fails_on_fourth_probe() {
        let dummy = DummyTransport::new(DummyConfig {
            corrupt_echo: Some(0xFF),
            ..Default::default()
        });
        let device = Device::new(dummy.clone());
        let err = device.connect().unwrap_err();
        assert!(matches!(err, SpiDriverError::Protocol(_)));
        assert!(device.is_open());
        // lock was released: a status query still goes through
        assert!(device.status().is_ok());
    }

    #[test]
    fn test_connect_twice_reuses_open_port() {
        let dummy = DummyTransport::new_default();
        let device = Device::new(dummy.clone());
        device.connect().unwrap();
        device.connect().unwrap();
        assert_eq!(dummy.wire_log().len(), 2 * (64 + 8));
    }

    #[test]
    fn test_not_connected() {
        let device = Device::new(DummyTransport::new_default());
        assert!(matches!(device.status(), Err(SpiDriverError::NotConnected)));
        assert!(matches!(
            device.set_output(Output::A, true),
            Err(SpiDriverError::NotConnected)
        ));
        assert!(matches!(device.write(&[1]), Err(SpiDriverError::NotConnected)));
        assert!(matches!(
            device.read(&mut [0u8; 1]),
            Err(SpiDriverError::NotConnected)
        ));
    }

    #[test]
    fn test_status_with_partial_reads() {
        let (device, dummy) = connected(DummyConfig {
            max_read: 3,
            ..Default::default()
        });
        let status = device.status().unwrap();
        assert_eq!(status.model(), "spidriver1");
        assert_eq!(status.serial(), "DUMMY001");
        assert_eq!(status.uptime(), Duration::from_secs(3600));
        assert_eq!(dummy.wire_log(), b"?");
        assert_eq!(dummy.read_calls(), protocol::STATUS_LEN.div_ceil(3));
    }

    #[test]
    fn test_set_output_wire_format() {
        let (device, dummy) = connected(DummyConfig::default());
        device.set_output(Output::A, true).unwrap();
        device.set_output(Output::B, false).unwrap();
        device.set_output(Output::ChipSelect, true).unwrap();
        device.set_output(Output::ChipSelect, false).unwrap();
        assert_eq!(dummy.wire_log(), vec![b'a', 1, b'b', 0, b's', b'u']);
        assert_eq!(dummy.read_calls(), 0);
    }

    #[test]
    fn test_output_reads_status() {
        let (device, dummy) = connected(DummyConfig::default());
        device.set_output(Output::B, true).unwrap();
        device.set_output(Output::ChipSelect, true).unwrap();
        assert!(!device.output(Output::A).unwrap());
        assert!(device.output(Output::B).unwrap());
        assert!(device.output(Output::ChipSelect).unwrap());
        assert!(dummy.output(Output::ChipSelect));
    }

    #[test]
    fn test_write_chunking() {
        for count in [1usize, 63, 64, 65, 128, 200] {
            let (device, dummy) = connected(DummyConfig::default());
            let data: Vec<u8> = (0..count).map(|i| i as u8).collect();
            assert_eq!(device.write(&data).unwrap(), count);

            let commands = split_commands(&dummy.wire_log());
            assert_eq!(commands.len(), count.div_ceil(64));
            assert_eq!(dummy.write_calls(), commands.len());
            let mut remaining = count;
            for cmd in &commands {
                let len = remaining.min(64);
                assert_eq!(cmd[0], 0xC0 + (len - 1) as u8);
                assert_eq!(cmd.len(), len + 1);
                remaining -= len;
            }
            assert_eq!(dummy.mosi(), data);
            assert_eq!(dummy.read_calls(), 0);
        }
    }

    #[test]
    fn test_read_chunking() {
        let (device, dummy) = connected(DummyConfig {
            max_read: 5,
            ..Default::default()
        });
        let miso: Vec<u8> = (0..130).map(|i| (i * 3) as u8).collect();
        dummy.push_miso(&miso);

        let mut buf = vec![0u8; 130];
        assert_eq!(device.read(&mut buf).unwrap(), 130);
        assert_eq!(buf, miso);

        let commands = split_commands(&dummy.wire_log());
        let headers: Vec<u8> = commands.iter().map(|c| c[0]).collect();
        assert_eq!(headers, vec![0xBF, 0xBF, 0x81]);
        assert!(commands.iter().all(|c| c[1..].iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_read_write_full_duplex() {
        let (device, dummy) = connected(DummyConfig::default());
        dummy.push_miso(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let tx = [1, 2, 3, 4, 5];
        let mut rx = [0u8; 5];
        assert_eq!(device.read_write(&mut rx, &tx).unwrap(), 5);
        assert_eq!(rx, [0xDE, 0xAD, 0xBE, 0xEF, 0xFF]);
        assert_eq!(dummy.wire_log(), vec![0x84, 1, 2, 3, 4, 5]);
        assert_eq!(dummy.mosi(), tx);
        assert_eq!(
            protocol::decode_header(0x84),
            Some((ChunkKind::Transfer, 5))
        );
    }

    #[test]
    fn test_read_write_spans_chunks() {
        let (device, dummy) = connected(DummyConfig::default());
        let miso: Vec<u8> = (0..130u32).map(|i| (i * 7 + 3) as u8).collect();
        dummy.push_miso(&miso);
        let tx: Vec<u8> = (0..130u32).map(|i| i as u8).collect();
        let mut rx = vec![0u8; 130];

        assert_eq!(device.read_write(&mut rx, &tx).unwrap(), 130);
        assert_eq!(rx, miso);
        assert_eq!(dummy.mosi(), tx);

        let headers: Vec<u8> = split_commands(&dummy.wire_log())
            .iter()
            .map(|c| c[0])
            .collect();
        assert_eq!(headers, vec![0xBF, 0xBF, 0x81]);
    }

    #[test]
    fn test_query_rejects_short_reply_buffer() {
        let (device, dummy) = connected(DummyConfig::default());
        let mut link = device.lock();
        let mut reply = [0u8; 4];
        assert!(matches!(
            query(&mut *link, Command::Status, &mut reply),
            Err(SpiDriverError::InvalidArgument(_))
        ));
        drop(link);
        assert!(dummy.wire_log().is_empty());
    }

    #[test]
    fn test_read_write_length_mismatch() {
        let (device, dummy) = connected(DummyConfig::default());
        let mut rx = [0u8; 2];
        assert!(matches!(
            device.read_write(&mut rx, &[1, 2, 3]),
            Err(SpiDriverError::InvalidArgument(_))
        ));
        assert!(dummy.wire_log().is_empty());
    }

    #[test]
    fn test_zero_length_is_noop() {
        let (device, dummy) = connected(DummyConfig::default());
        assert_eq!(device.write(&[]).unwrap(), 0);
        assert_eq!(device.read(&mut []).unwrap(), 0);
        assert_eq!(device.read_write(&mut [], &[]).unwrap(), 0);
        assert_eq!(dummy.write_calls(), 0);
        assert_eq!(dummy.read_calls(), 0);

        // also fine while closed
        device.close();
        assert_eq!(device.write(&[]).unwrap(), 0);
    }

    #[test]
    fn test_read_timeout_aborts_and_releases_lock() {
        let (device, dummy) = connected(DummyConfig::default());
        dummy.set_silent(true);
        let mut buf = [0u8; 100];
        assert!(matches!(device.read(&mut buf), Err(SpiDriverError::Timeout)));
        // the first chunk went out before the failure; nothing after it
        assert_eq!(dummy.wire_log().len(), 65);

        dummy.set_silent(false);
        device.set_output(Output::A, true).unwrap();
        assert!(dummy.output(Output::A));
    }

    #[test]
    fn test_connect_times_out_on_silent_link() {
        let dummy = DummyTransport::new_default();
        dummy.set_silent(true);
        let device = Device::new(dummy.clone());
        let err = device.connect().unwrap_err();
        assert!(err.is_transport());
        assert!(device.is_open());
    }

    #[test]
    fn test_timeouts_forwarded() {
        let device = Device::new(DummyTransport::new_default());
        assert_eq!(device.read_timeout(), None);
        device
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        device
            .set_write_timeout(Some(Duration::from_millis(50)))
            .unwrap();
        assert_eq!(device.read_timeout(), Some(Duration::from_millis(100)));
        assert_eq!(device.write_timeout(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_concurrent_callers_do_not_interleave() {
        let (device, dummy) = connected(DummyConfig {
            max_read: 7,
            ..Default::default()
        });
        let payload = vec![0x5A; 200];

        std::thread::scope(|s| {
            let writer = device.clone();
            let payload = &payload;
            s.spawn(move || {
                for _ in 0..20 {
                    writer.write(payload).unwrap();
                }
            });
            let reader = device.clone();
            s.spawn(move || {
                for _ in 0..20 {
                    let mut buf = [0u8; 70];
                    reader.read(&mut buf).unwrap();
                }
            });
            let pins = device.clone();
            s.spawn(move || {
                for i in 0..20 {
                    pins.set_output(Output::A, i % 2 == 0).unwrap();
                    pins.status().unwrap();
                }
            });
        });

        let commands = split_commands(&dummy.wire_log());
        // write chunks carry only the write payload, read chunks only zeros
        for cmd in &commands {
            match protocol::decode_header(cmd[0]) {
                Some((ChunkKind::Write, _)) => assert!(cmd[1..].iter().all(|&b| b == 0x5A)),
                Some((ChunkKind::Transfer, _)) => assert!(cmd[1..].iter().all(|&b| b == 0)),
                None => {}
            }
        }
        // each bulk call's chunks are contiguous
        let kinds: Vec<Option<ChunkKind>> = commands
            .iter()
            .map(|c| protocol::decode_header(c[0]).map(|(k, _)| k))
            .collect();
        let mut i = 0;
        while i < kinds.len() {
            match kinds[i] {
                Some(ChunkKind::Write) => {
                    assert_eq!(&kinds[i..i + 4], &[Some(ChunkKind::Write); 4]);
                    i += 4;
                }
                Some(ChunkKind::Transfer) => {
                    assert_eq!(&kinds[i..i + 2], &[Some(ChunkKind::Transfer); 2]);
                    i += 2;
                }
                None => i += 1,
            }
        }
        assert_eq!(dummy.unknown_bytes(), 0);
    }

    #[test]
    fn test_stream_adapter() {
        use std::io::{Read, Write};

        let (device, dummy) = connected(DummyConfig::default());
        let mut stream = device.stream();
        stream.write_all(&[9, 8, 7]).unwrap();
        stream.flush().unwrap();
        dummy.push_miso(&[1, 2]);
        let mut buf = [0u8; 2];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(dummy.wire_log(), vec![0xC2, 9, 8, 7, 0x81, 0, 0]);

        device.close();
        assert!(matches!(
            device.flush(),
            Err(SpiDriverError::NotConnected)
        ));
        assert!(stream.flush().is_err());
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;

        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn test_async_matches_sync_wire_bytes() {
            let dummy = DummyTransport::new_default();
            let device = Device::new(dummy.clone());
            device.connect_async().await.unwrap();
            dummy.clear_log();

            device.set_output_async(Output::B, true).await.unwrap();
            assert_eq!(device.write_async(vec![0x11; 70]).await.unwrap(), 70);
            dummy.push_miso(&[0x42; 3]);
            assert_eq!(device.read_async(3).await.unwrap(), vec![0x42; 3]);
            dummy.push_miso(&[0x24]);
            assert_eq!(device.read_write_async(vec![7]).await.unwrap(), vec![0x24]);
            assert!(device.output_async(Output::B).await.unwrap());
            assert_eq!(device.status_async().await.unwrap().model(), "spidriver1");

            let mut expected = vec![b'b', 1, 0xFF];
            expected.extend_from_slice(&[0x11; 64]);
            expected.push(0xC5);
            expected.extend_from_slice(&[0x11; 6]);
            expected.extend_from_slice(&[0x82, 0, 0, 0]);
            expected.extend_from_slice(&[0x80, 7]);
            expected.push(b'?');
            expected.push(b'?');
            assert_eq!(dummy.wire_log(), expected);
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn test_async_and_sync_share_lock() {
            let (device, dummy) = connected(DummyConfig::default());
            let sync_device = device.clone();
            let sync_task = std::thread::spawn(move || {
                for _ in 0..10 {
                    sync_device.write(&[0x33; 100]).unwrap();
                }
            });
            for _ in 0..10 {
                device.write_async(vec![0x44; 100]).await.unwrap();
            }
            sync_task.join().unwrap();

            let commands = split_commands(&dummy.wire_log());
            assert_eq!(commands.len(), 40);
            for pair in commands.chunks(2) {
                assert_eq!(pair[0][0], 0xFF);
                assert_eq!(pair[1][0], 0xC0 + 35);
                assert_eq!(pair[0][1], pair[1][1]);
            }
        }

        #[tokio::test]
        async fn test_async_not_connected() {
            let device = Device::new(DummyTransport::new_default());
            assert!(matches!(
                device.status_async().await,
                Err(SpiDriverError::NotConnected)
            ));
            assert_eq!(device.write_async(Vec::new()).await.unwrap(), 0);
        }
    }
}
