//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse a hex string such as `9f000000`, `9f 00 00` or `0x9f,0x1`
///
/// Each separated token of one or two digits is a byte; a longer token is
/// read as a run of digit pairs.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    for token in s
        .split(|c: char| c.is_whitespace() || c == ',' || c == ':')
        .filter(|t| !t.is_empty())
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("Invalid hex value: '{}'", token));
        }
        if digits.len() > 2 && digits.len() % 2 != 0 {
            return Err(format!("Odd number of hex digits in '{}'", token));
        }
        for pair in digits.as_bytes().chunks(2) {
            // All ASCII hex digits, so both the slice and the parse succeed
            let text = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            bytes.push(u8::from_str_radix(text, 16).map_err(|e| e.to_string())?);
        }
    }
    if bytes.is_empty() {
        return Err("No bytes given".into());
    }
    Ok(bytes)
}

/// Parse an on/off switch
fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "yes" | "1" | "true" => Ok(true),
        "off" | "no" | "0" | "false" => Ok(false),
        _ => Err(format!("Expected on or off, got '{}'", s)),
    }
}

#[derive(Parser)]
#[command(name = "spidriver")]
#[command(author, version, about = "Serial-to-SPI bridge client", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection options shared across commands
#[derive(Args, Debug, Clone)]
pub struct PortArgs {
    /// Serial port, optionally with baud rate (e.g. /dev/ttyUSB0:460800), or "dummy"
    #[arg(short, long)]
    pub port: String,

    /// Read/write timeout in milliseconds (0 waits forever)
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show device status
    Status {
        #[command(flatten)]
        port: PortArgs,
    },

    /// Set or toggle an output (a, b or cs)
    Set {
        #[command(flatten)]
        port: PortArgs,

        /// Output to drive
        output: String,

        /// New state (on/off); toggles when omitted
        #[arg(value_parser = parse_switch)]
        state: Option<bool>,
    },

    /// Read bytes from the SPI bus
    Read {
        #[command(flatten)]
        port: PortArgs,

        /// Number of bytes to read
        count: usize,

        /// Output file (hex dump to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a file to the SPI bus
    Write {
        #[command(flatten)]
        port: PortArgs,

        /// Input file path
        input: PathBuf,
    },

    /// Full-duplex transfer of hex bytes
    Transfer {
        #[command(flatten)]
        port: PortArgs,

        /// Bytes to send, as hex (e.g. `9f000000` or `9f 00 00 00`)
        #[arg(required = true)]
        data: Vec<String>,
    },

    /// Interactive shell
    #[cfg(feature = "shell")]
    Shell {
        /// Serial port to connect to on startup
        #[arg(short, long)]
        port: Option<String>,

        /// Read/write timeout in milliseconds (0 waits forever)
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
    },
}
