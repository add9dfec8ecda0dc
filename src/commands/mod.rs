//! CLI command implementations
//!
//! Every one-shot command goes through [`connect`], which opens the port
//! (or the in-memory emulator for `dummy`) and runs the connection test.

pub mod output;
#[cfg(feature = "shell")]
pub mod shell;
pub mod status;
pub mod transfer;

use crate::cli::PortArgs;
use spidriver_core::{open_device, BoxedDevice};
use std::time::Duration;

/// Convert a millisecond timeout flag, 0 meaning unbounded
pub fn timeout(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Open the port and run the connection test
pub fn connect(args: &PortArgs) -> Result<BoxedDevice, Box<dyn std::error::Error>> {
    let device = open_device(&args.port, timeout(args.timeout_ms))?;
    device.connect()?;
    log::info!("Connected to {}", args.port);
    Ok(device)
}
