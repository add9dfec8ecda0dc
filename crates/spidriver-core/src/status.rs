//! Decoding of the 80-byte status line
//!
//! The gadget answers a status query with space-padded ASCII text:
//!
//! ```text
//! [model serial uptime voltage current temperature a b cs]
//! ```

use crate::error::{Result, SpiDriverError};
use core::fmt;
use core::str::FromStr;
use std::time::Duration;

/// Number of fields inside the brackets
pub const STATUS_FIELDS: usize = 9;

/// Snapshot of the gadget state
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    model: String,
    serial: String,
    uptime: Duration,
    voltage: f32,
    current: f32,
    temperature: f32,
    a: bool,
    b: bool,
    chip_select: bool,
    crc: u16,
}

impl DeviceStatus {
    /// Decode a raw status response
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = core::str::from_utf8(raw)
            .map_err(|_| SpiDriverError::Protocol("status response is not ASCII text".into()))?;
        text.parse()
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Serial number
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Time since the gadget powered up
    pub fn uptime(&self) -> Duration {
        self.uptime
    }

    /// Supply voltage in volts
    pub fn voltage(&self) -> f32 {
        self.voltage
    }

    /// Supply current in amps
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Temperature in degrees Celsius
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Output A state
    pub fn a(&self) -> bool {
        self.a
    }

    /// Output B state
    pub fn b(&self) -> bool {
        self.b
    }

    /// Chip select state
    pub fn chip_select(&self) -> bool {
        self.chip_select
    }

    /// CRC reported by the gadget
    ///
    /// Decoded as hex from the same token as output A.
    pub fn crc(&self) -> u16 {
        self.crc
    }

    /// State of one output
    pub fn output(&self, output: crate::Output) -> bool {
        match output {
            crate::Output::A => self.a,
            crate::Output::B => self.b,
            crate::Output::ChipSelect => self.chip_select,
        }
    }
}

fn field<T: FromStr>(token: &str, name: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| SpiDriverError::Protocol(format!("invalid {} field '{}'", name, token)))
}

fn flag(token: &str, name: &str) -> Result<bool> {
    Ok(field::<i32>(token, name)? == 1)
}

impl FromStr for DeviceStatus {
    type Err = SpiDriverError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0');
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| {
                SpiDriverError::Protocol(format!("status '{}' is not bracketed", trimmed))
            })?;

        let tokens: Vec<&str> = inner.split(' ').collect();
        if tokens.len() != STATUS_FIELDS {
            return Err(SpiDriverError::Protocol(format!(
                "status has {} fields, expected {}",
                tokens.len(),
                STATUS_FIELDS
            )));
        }

        // the A token doubles as the CRC field
        let crc = u16::from_str_radix(tokens[6], 16)
            .map_err(|_| SpiDriverError::Protocol(format!("invalid crc field '{}'", tokens[6])))?;

        Ok(Self {
            model: tokens[0].to_string(),
            serial: tokens[1].to_string(),
            uptime: Duration::from_secs(field(tokens[2], "uptime")?),
            voltage: field(tokens[3], "voltage")?,
            current: field(tokens[4], "current")?,
            temperature: field(tokens[5], "temperature")?,
            a: flag(tokens[6], "A")?,
            b: flag(tokens[7], "B")?,
            chip_select: flag(tokens[8], "CS")?,
            crc,
        })
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.model)?;
        writeln!(f, "Serial Number: {}", self.serial)?;
        writeln!(f, "Uptime: {}s", self.uptime.as_secs())?;
        writeln!(f, "Voltage: {}V", self.voltage)?;
        writeln!(f, "Current: {}A", self.current)?;
        writeln!(f, "Temperature: {}°C", self.temperature)?;
        writeln!(f, "A: {}", self.a)?;
        writeln!(f, "B: {}", self.b)?;
        writeln!(f, "CS: {}", self.chip_select)?;
        write!(f, "CRC: 0x{:04x}", self.crc)
    }
}
