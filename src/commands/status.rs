//! Status command implementation

use crate::cli::PortArgs;

/// Print the device status
pub fn run_status(args: &PortArgs) -> Result<(), Box<dyn std::error::Error>> {
    let device = super::connect(args)?;
    let status = device.status()?;
    println!("{}", status);
    device.close();
    Ok(())
}
