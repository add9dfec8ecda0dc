//! Bridge protocol constants and frame encoding
//!
//! Bulk transfers are split into chunks of at most [`MAX_CHUNK`] bytes. Each
//! chunk is preceded by a single header byte:
//!
//! | Header     | Meaning                                   |
//! |------------|-------------------------------------------|
//! | `11xxxxxx` | write `xxxxxx + 1` bytes, no response     |
//! | `10xxxxxx` | exchange `xxxxxx + 1` bytes, read back    |
//!
//! Everything else on the wire is a short ASCII command.

use crate::output::Output;
use core::ops::Range;

/// Baud rate the gadget firmware listens on
pub const DEFAULT_BAUD: u32 = 460_800;

/// Maximum payload length of a single chunk
pub const MAX_CHUNK: usize = 64;

/// Largest encoded frame: header byte plus a full chunk
pub const MAX_FRAME: usize = MAX_CHUNK + 1;

/// Length of the status response
pub const STATUS_LEN: usize = 80;

/// Filler byte sent to let the gadget settle after opening the port
pub const PRIME_BYTE: u8 = b'@';
/// Number of priming bytes
pub const PRIME_LEN: usize = 64;

/// Probe bytes echoed back during the connection test, in order
pub const ECHO_PROBES: [u8; 4] = [b'A', b'\r', b'\n', 0xFF];

// Command opcodes
/// Echo the following byte
pub const CMD_ECHO: u8 = b'e';
/// Query the status line
pub const CMD_STATUS: u8 = b'?';
/// Set output A (followed by 0 or 1)
pub const CMD_SET_A: u8 = b'a';
/// Set output B (followed by 0 or 1)
pub const CMD_SET_B: u8 = b'b';
/// Assert chip select
pub const CMD_SELECT: u8 = b's';
/// Release chip select
pub const CMD_UNSELECT: u8 = b'u';

/// Header base for write-only chunks
pub const HDR_WRITE: u8 = 0xC0;
/// Header base for read / read-write chunks
pub const HDR_TRANSFER: u8 = 0x80;

const HDR_KIND_MASK: u8 = 0xC0;
const HDR_LEN_MASK: u8 = 0x3F;

/// Kind of bulk chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// MOSI only, the gadget sends nothing back
    Write,
    /// Full duplex, the gadget returns one byte per byte clocked out
    Transfer,
}

impl ChunkKind {
    /// Whether the gadget answers this chunk
    pub fn expects_response(self) -> bool {
        matches!(self, ChunkKind::Transfer)
    }
}

/// Encode the header byte for a chunk of `len` bytes
///
/// `len` must be in `1..=MAX_CHUNK`.
pub fn header(kind: ChunkKind, len: usize) -> u8 {
    debug_assert!((1..=MAX_CHUNK).contains(&len), "chunk length {} out of range", len);
    let base = match kind {
        ChunkKind::Write => HDR_WRITE,
        ChunkKind::Transfer => HDR_TRANSFER,
    };
    base | ((len - 1) as u8 & HDR_LEN_MASK)
}

/// Decode a header byte into its kind and payload length
///
/// Returns `None` for bytes that are not chunk headers.
pub fn decode_header(byte: u8) -> Option<(ChunkKind, usize)> {
    let len = (byte & HDR_LEN_MASK) as usize + 1;
    match byte & HDR_KIND_MASK {
        HDR_WRITE => Some((ChunkKind::Write, len)),
        HDR_TRANSFER => Some((ChunkKind::Transfer, len)),
        _ => None,
    }
}

/// Iterator over the chunk ranges of a transfer
///
/// Yields `offset..offset + len` with `len = min(MAX_CHUNK, count - offset)`.
/// A zero count yields nothing.
#[derive(Debug, Clone)]
pub struct Chunks {
    offset: usize,
    count: usize,
}

impl Chunks {
    /// Split `count` bytes into chunks
    pub fn new(count: usize) -> Self {
        Self { offset: 0, count }
    }
}

impl Iterator for Chunks {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.count {
            return None;
        }
        let len = MAX_CHUNK.min(self.count - self.offset);
        let range = self.offset..self.offset + len;
        self.offset += len;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count.saturating_sub(self.offset)).div_ceil(MAX_CHUNK);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks {}

/// An encoded chunk: header byte followed by its payload
///
/// Built on the stack for each chunk and handed to a single transport write.
/// Payloads come from [`Chunks`] ranges and never exceed [`MAX_CHUNK`].
#[derive(Clone)]
pub struct Frame {
    buf: [u8; MAX_FRAME],
    len: usize,
}

impl Frame {
    fn encode(kind: ChunkKind, payload: &[u8]) -> Self {
        let mut buf = [0u8; MAX_FRAME];
        buf[0] = header(kind, payload.len());
        buf[1..=payload.len()].copy_from_slice(payload);
        Self {
            buf,
            len: payload.len() + 1,
        }
    }

    /// Write-only chunk carrying `payload`
    pub(crate) fn write(payload: &[u8]) -> Self {
        Self::encode(ChunkKind::Write, payload)
    }

    /// Full-duplex chunk clocking out `payload`
    pub(crate) fn transfer(payload: &[u8]) -> Self {
        Self::encode(ChunkKind::Transfer, payload)
    }

    /// Read chunk of `len` bytes: a transfer with an all-zero payload
    pub(crate) fn read(len: usize) -> Self {
        Self::encode(ChunkKind::Transfer, &[0u8; MAX_CHUNK][..len])
    }

    /// Header byte
    pub fn header(&self) -> u8 {
        self.buf[0]
    }

    /// Number of payload bytes following the header
    pub fn payload_len(&self) -> usize {
        self.len - 1
    }

    /// Bytes to put on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl core::fmt::Debug for Frame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Frame")
            .field("header", &format_args!("0x{:02X}", self.header()))
            .field("len", &self.payload_len())
            .finish()
    }
}

/// Short, non-bulk commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask the gadget to echo one byte
    Echo(u8),
    /// Request the status line
    Status,
    /// Drive output A
    SetA(bool),
    /// Drive output B
    SetB(bool),
    /// Assert chip select
    Select,
    /// Release chip select
    Unselect,
}

impl Command {
    /// Command that drives `output` to `enable`
    pub fn for_output(output: Output, enable: bool) -> Self {
        match output {
            Output::A => Command::SetA(enable),
            Output::B => Command::SetB(enable),
            Output::ChipSelect if enable => Command::Select,
            Output::ChipSelect => Command::Unselect,
        }
    }

    /// Encode into `buf`, returning the bytes to send
    pub fn encode(self, buf: &mut [u8; 2]) -> &[u8] {
        let len = match self {
            Command::Echo(b) => {
                *buf = [CMD_ECHO, b];
                2
            }
            Command::Status => {
                buf[0] = CMD_STATUS;
                1
            }
            Command::SetA(on) => {
                *buf = [CMD_SET_A, on as u8];
                2
            }
            Command::SetB(on) => {
                *buf = [CMD_SET_B, on as u8];
                2
            }
            Command::Select => {
                buf[0] = CMD_SELECT;
                1
            }
            Command::Unselect => {
                buf[0] = CMD_UNSELECT;
                1
            }
        };
        &buf[..len]
    }

    /// Number of response bytes the gadget sends for this command
    pub fn response_len(self) -> usize {
        match self {
            Command::Echo(_) => 1,
            Command::Status => STATUS_LEN,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_counts() {
        for count in [0usize, 1, 63, 64, 65, 128, 200] {
            let chunks: Vec<_> = Chunks::new(count).collect();
            assert_eq!(chunks.len(), count.div_ceil(MAX_CHUNK), "count {}", count);
            assert_eq!(Chunks::new(count).len(), chunks.len());

            let mut remaining = count;
            let mut expected_offset = 0;
            for range in &chunks {
                assert_eq!(range.start, expected_offset);
                let len = range.len();
                assert_eq!(len, remaining.min(MAX_CHUNK));
                assert!((1..=MAX_CHUNK).contains(&len));
                assert_eq!(
                    header(ChunkKind::Write, len) & 0x3F,
                    (remaining.min(MAX_CHUNK) - 1) as u8
                );
                remaining -= len;
                expected_offset += len;
            }
            assert_eq!(remaining, 0);
            assert_eq!(chunks.iter().map(|r| r.len()).sum::<usize>(), count);
        }
    }

    #[test]
    fn test_last_chunk_is_short() {
        let chunks: Vec<_> = Chunks::new(200).collect();
        assert_eq!(chunks, vec![0..64, 64..128, 128..192, 192..200]);
    }

    #[test]
    fn test_header_encoding() {
        assert_eq!(header(ChunkKind::Write, 1), 0xC0);
        assert_eq!(header(ChunkKind::Write, 64), 0xFF);
        assert_eq!(header(ChunkKind::Transfer, 1), 0x80);
        assert_eq!(header(ChunkKind::Transfer, 64), 0xBF);
        for len in 1..=MAX_CHUNK {
            assert_eq!(header(ChunkKind::Write, len), 0xC0 + (len as u8 - 1));
            assert_eq!(header(ChunkKind::Transfer, len), 0x80 + (len as u8 - 1));
            assert_eq!(
                decode_header(header(ChunkKind::Write, len)),
                Some((ChunkKind::Write, len))
            );
            assert_eq!(
                decode_header(header(ChunkKind::Transfer, len)),
                Some((ChunkKind::Transfer, len))
            );
        }
        assert_eq!(decode_header(b'?'), None);
        assert_eq!(decode_header(b'e'), None);
    }

    #[test]
    fn test_frames() {
        let frame = Frame::write(&[1, 2, 3]);
        assert_eq!(frame.as_bytes(), &[0xC2, 1, 2, 3]);
        assert_eq!(frame.payload_len(), 3);

        let frame = Frame::transfer(&[0xAA; 64]);
        assert_eq!(frame.header(), 0xBF);
        assert_eq!(frame.as_bytes().len(), 65);

        let frame = Frame::read(5);
        assert_eq!(frame.as_bytes(), &[0x84, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_command_encoding() {
        let mut buf = [0u8; 2];
        assert_eq!(Command::Echo(0xFF).encode(&mut buf), &[b'e', 0xFF]);
        assert_eq!(Command::Status.encode(&mut buf), b"?");
        assert_eq!(
            Command::for_output(Output::A, true).encode(&mut buf),
            &[b'a', 1]
        );
        assert_eq!(
            Command::for_output(Output::B, false).encode(&mut buf),
            &[b'b', 0]
        );
        assert_eq!(
            Command::for_output(Output::ChipSelect, true).encode(&mut buf),
            b"s"
        );
        assert_eq!(
            Command::for_output(Output::ChipSelect, false).encode(&mut buf),
            b"u"
        );
        assert_eq!(Command::Status.response_len(), STATUS_LEN);
        assert_eq!(Command::Select.response_len(), 0);
    }
}
