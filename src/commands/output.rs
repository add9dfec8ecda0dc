//! Output (A, B, CS) command implementation

use crate::cli::PortArgs;
use spidriver_core::{BoxedDevice, Output};

/// Set `output` to `state`, or toggle it when `state` is `None`
///
/// Returns the new level.
pub fn apply(
    device: &BoxedDevice,
    output: Output,
    state: Option<bool>,
) -> spidriver_core::Result<bool> {
    let level = match state {
        Some(level) => level,
        None => !device.output(output)?,
    };
    device.set_output(output, level)?;
    Ok(level)
}

/// Run the set command
pub fn run_set(
    args: &PortArgs,
    output: &str,
    state: Option<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output: Output = output.parse()?;
    let device = super::connect(args)?;
    let level = apply(&device, output, state)?;
    println!("{}: {}", output, level);
    device.close();
    Ok(())
}
