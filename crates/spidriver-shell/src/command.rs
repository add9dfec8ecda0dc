//! Shell command parsing

use crate::error::ShellError;
use spidriver_core::Output;
use std::path::PathBuf;

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line
    Empty,
    /// `connect PORT`
    Connect(String),
    /// `a|b|cs [on|off]`; `None` toggles
    Output(Output, Option<bool>),
    /// `status`
    Status,
    /// `read COUNT`
    Read(usize),
    /// `writef PATH`
    WriteFile(PathBuf),
    /// `xfer HEX...`
    Transfer(Vec<u8>),
    /// `help`
    Help,
    /// `quit`, `q` or `exit`
    Quit,
}

fn parse_switch(arg: &str) -> Result<bool, ShellError> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "yes" | "1" | "true" => Ok(true),
        "off" | "no" | "0" | "false" => Ok(false),
        _ => Err(ShellError::InvalidArgument(format!(
            "expected on or off, got '{}'",
            arg
        ))),
    }
}

fn parse_hex_byte(token: &str) -> Result<u8, ShellError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u8::from_str_radix(digits, 16)
        .map_err(|_| ShellError::InvalidArgument(format!("invalid hex byte '{}'", token)))
}

/// Parse one input line
pub fn parse_line(line: &str) -> Result<ShellCommand, ShellError> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(ShellCommand::Empty);
    };
    let args: Vec<&str> = parts.collect();

    match cmd.to_ascii_lowercase().as_str() {
        "connect" => match args.first() {
            Some(port) => Ok(ShellCommand::Connect(port.to_string())),
            None => Err(ShellError::InvalidArgument("connect <port>".into())),
        },
        "a" | "b" | "cs" => {
            let output: Output = cmd.parse()?;
            let value = args.first().map(|a| parse_switch(a)).transpose()?;
            Ok(ShellCommand::Output(output, value))
        }
        "status" => Ok(ShellCommand::Status),
        "read" => {
            let count = args
                .first()
                .ok_or_else(|| ShellError::InvalidArgument("read <count>".into()))?;
            let count = count.parse().map_err(|_| {
                ShellError::InvalidArgument(format!("invalid count to read '{}'", count))
            })?;
            Ok(ShellCommand::Read(count))
        }
        "writef" => {
            if args.is_empty() {
                return Err(ShellError::InvalidArgument("writef <path>".into()));
            }
            Ok(ShellCommand::WriteFile(PathBuf::from(args.join(" "))))
        }
        "xfer" => {
            if args.is_empty() {
                return Err(ShellError::InvalidArgument("xfer <hex bytes...>".into()));
            }
            let bytes = args
                .iter()
                .map(|t| parse_hex_byte(t))
                .collect::<Result<Vec<u8>, _>>()?;
            Ok(ShellCommand::Transfer(bytes))
        }
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "q" | "exit" => Ok(ShellCommand::Quit),
        other => Err(ShellError::InvalidArgument(format!(
            "unknown command '{}', type help for a list",
            other
        ))),
    }
}
