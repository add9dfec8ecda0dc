//! In-memory gadget emulator
//!
//! [`DummyTransport`] speaks the bridge protocol without hardware. It parses
//! the command stream byte by byte, keeps pin state, answers echo and status
//! requests, and records everything written to it. Clones share state, so a
//! test can keep one clone for inspection while a [`crate::Device`] owns
//! another.

use crate::error::{Result, SpiDriverError};
use crate::output::Output;
use crate::protocol::{self, ChunkKind, STATUS_LEN};
use crate::transport::Transport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Configuration for the emulated gadget
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Model reported in the status line
    pub model: String,
    /// Serial number reported in the status line
    pub serial: String,
    /// Uptime reported in the status line
    pub uptime: Duration,
    /// Supply voltage in volts
    pub voltage: f32,
    /// Supply current in amps
    pub current: f32,
    /// Temperature in degrees Celsius
    pub temperature: f32,
    /// Upper bound on bytes returned by a single read
    pub max_read: usize,
    /// Echo probe whose answer is corrupted
    pub corrupt_echo: Option<u8>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            model: "spidriver1".into(),
            serial: "DUMMY001".into(),
            uptime: Duration::from_secs(3600),
            voltage: 5.05,
            current: 0.12,
            temperature: 23.4,
            max_read: usize::MAX,
            corrupt_echo: None,
        }
    }
}

/// Where the command parser is within the byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Idle,
    EchoArg,
    PinArg(Output),
    Chunk { kind: ChunkKind, remaining: usize },
}

#[derive(Debug)]
struct State {
    config: DummyConfig,
    open: bool,
    parse: ParseState,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    /// Bytes queued for the host
    pending: VecDeque<u8>,
    /// Bytes clocked in from the target during transfers
    miso: VecDeque<u8>,
    /// Bytes clocked out to the target
    mosi: Vec<u8>,
    /// Every byte the host wrote
    wire: Vec<u8>,
    a: bool,
    b: bool,
    chip_select: bool,
    /// Swallow replies instead of queueing them
    silent: bool,
    read_calls: usize,
    write_calls: usize,
    unknown: usize,
}

impl State {
    fn new(config: DummyConfig) -> Self {
        Self {
            config,
            open: false,
            parse: ParseState::Idle,
            read_timeout: None,
            write_timeout: None,
            pending: VecDeque::new(),
            miso: VecDeque::new(),
            mosi: Vec::new(),
            wire: Vec::new(),
            a: false,
            b: false,
            chip_select: false,
            silent: false,
            read_calls: 0,
            write_calls: 0,
            unknown: 0,
        }
    }

    fn status_line(&self) -> Vec<u8> {
        let mut line = format!(
            "[{} {} {} {:.3} {:.3} {:.1} {} {} {}]",
            self.config.model,
            self.config.serial,
            self.config.uptime.as_secs(),
            self.config.voltage,
            self.config.current,
            self.config.temperature,
            self.a as u8,
            self.b as u8,
            self.chip_select as u8,
        )
        .into_bytes();
        line.resize(STATUS_LEN, b' ');
        line
    }

    fn reply(&mut self, bytes: &[u8]) {
        if !self.silent {
            self.pending.extend(bytes.iter().copied());
        }
    }

    fn feed(&mut self, byte: u8) {
        let parse = self.parse;
        self.parse = match parse {
            ParseState::Idle => self.command(byte),
            ParseState::EchoArg => {
                let answer = if self.config.corrupt_echo == Some(byte) {
                    !byte
                } else {
                    byte
                };
                self.reply(&[answer]);
                ParseState::Idle
            }
            ParseState::PinArg(output) => {
                let on = byte == 1;
                match output {
                    Output::A => self.a = on,
                    Output::B => self.b = on,
                    Output::ChipSelect => self.chip_select = on,
                }
                ParseState::Idle
            }
            ParseState::Chunk { kind, remaining } => {
                self.mosi.push(byte);
                if kind.expects_response() {
                    let reply = self.miso.pop_front().unwrap_or(0xFF);
                    self.reply(&[reply]);
                }
                if remaining > 1 {
                    ParseState::Chunk {
                        kind,
                        remaining: remaining - 1,
                    }
                } else {
                    ParseState::Idle
                }
            }
        };
    }

    fn command(&mut self, byte: u8) -> ParseState {
        if let Some((kind, len)) = protocol::decode_header(byte) {
            return ParseState::Chunk {
                kind,
                remaining: len,
            };
        }
        match byte {
            protocol::PRIME_BYTE => {}
            protocol::CMD_ECHO => return ParseState::EchoArg,
            protocol::CMD_STATUS => {
                let line = self.status_line();
                self.reply(&line);
            }
            protocol::CMD_SET_A => return ParseState::PinArg(Output::A),
            protocol::CMD_SET_B => return ParseState::PinArg(Output::B),
            protocol::CMD_SELECT => self.chip_select = true,
            protocol::CMD_UNSELECT => self.chip_select = false,
            other => {
                log::warn!("dummy: ignoring unknown command byte 0x{:02X}", other);
                self.unknown += 1;
            }
        }
        ParseState::Idle
    }
}

/// Emulated gadget behind a [`Transport`]
#[derive(Debug, Clone)]
pub struct DummyTransport {
    state: Arc<Mutex<State>>,
}

impl DummyTransport {
    /// Create an emulator with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::new(config))),
        }
    }

    /// Create an emulator with default settings
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue bytes the target will shift out during transfers
    pub fn push_miso(&self, data: &[u8]) {
        self.state().miso.extend(data.iter().copied());
    }

    /// Bytes shifted out to the target so far
    pub fn mosi(&self) -> Vec<u8> {
        self.state().mosi.clone()
    }

    /// Every byte the host has written
    pub fn wire_log(&self) -> Vec<u8> {
        self.state().wire.clone()
    }

    /// Forget recorded traffic
    pub fn clear_log(&self) {
        let mut state = self.state();
        state.wire.clear();
        state.mosi.clear();
        state.read_calls = 0;
        state.write_calls = 0;
    }

    /// Current level of an output
    pub fn output(&self, output: Output) -> bool {
        let state = self.state();
        match output {
            Output::A => state.a,
            Output::B => state.b,
            Output::ChipSelect => state.chip_select,
        }
    }

    /// Number of read calls served
    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    /// Number of write calls received
    pub fn write_calls(&self) -> usize {
        self.state().write_calls
    }

    /// Number of bytes that did not parse as a command
    pub fn unknown_bytes(&self) -> usize {
        self.state().unknown
    }

    /// Stop (or resume) answering, so reads time out like a stalled link
    pub fn set_silent(&self, silent: bool) {
        self.state().silent = silent;
    }
}

impl Default for DummyTransport {
    fn default() -> Self {
        Self::new_default()
    }
}

impl Transport for DummyTransport {
    fn open(&mut self) -> Result<()> {
        let mut state = self.state();
        if !state.open {
            log::info!("dummy: opened emulated bridge {}", state.config.serial);
            state.open = true;
        }
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state();
        state.open = false;
        state.pending.clear();
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.state();
        if !state.open {
            return Err(SpiDriverError::NotConnected);
        }
        state.read_calls += 1;
        if state.pending.is_empty() {
            return Err(SpiDriverError::Timeout);
        }
        let n = buf
            .len()
            .min(state.config.max_read)
            .min(state.pending.len());
        for (slot, byte) in buf.iter_mut().zip(state.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        if !state.open {
            return Err(SpiDriverError::NotConnected);
        }
        state.write_calls += 1;
        state.wire.extend_from_slice(data);
        for &byte in data {
            state.feed(byte);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_timeout(&self) -> Option<Duration> {
        self.state().read_timeout
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.state().read_timeout = timeout;
        Ok(())
    }

    fn write_timeout(&self) -> Option<Duration> {
        self.state().write_timeout
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.state().write_timeout = timeout;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::DeviceStatus;
    use crate::wire::read_exact;

    #[test]
    fn test_requires_open() {
        let mut t = DummyTransport::new_default();
        assert!(matches!(t.write(b"?"), Err(SpiDriverError::NotConnected)));
        t.open().unwrap();
        assert!(t.is_open());
        t.close();
        assert!(!t.is_open());
    }

    #[test]
    fn test_status_line_is_parseable() {
        let mut t = DummyTransport::new_default();
        t.open().unwrap();
        t.write(b"a\x01").unwrap();
        t.write(b"?").unwrap();
        let mut raw = [0u8; STATUS_LEN];
        read_exact(&mut t, &mut raw).unwrap();
        let status = DeviceStatus::parse(&raw).unwrap();
        assert_eq!(status.model(), "spidriver1");
        assert!(status.a());
        assert!(!status.chip_select());
    }

    #[test]
    fn test_commands_split_across_writes() {
        let mut t = DummyTransport::new_default();
        t.open().unwrap();
        t.write(&[0xC2, 1]).unwrap();
        t.write(&[2, 3, b'b']).unwrap();
        t.write(&[1]).unwrap();
        assert_eq!(t.mosi(), vec![1, 2, 3]);
        assert!(t.output(Output::B));
        assert_eq!(t.unknown_bytes(), 0);
    }

    #[test]
    fn test_transfer_returns_miso() {
        let mut t = DummyTransport::new_default();
        t.open().unwrap();
        t.push_miso(&[0x10, 0x20]);
        t.write(&[0x82, 7, 8, 9]).unwrap();
        let mut buf = [0u8; 3];
        read_exact(&mut t, &mut buf).unwrap();
        assert_eq!(buf, [0x10, 0x20, 0xFF]);
        assert!(matches!(t.read(&mut buf), Err(SpiDriverError::Timeout)));
    }
}
