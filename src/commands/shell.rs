//! Shell command implementation

use std::time::Duration;

/// Run the interactive shell, connecting to `port` first if given
pub fn cmd_shell(
    port: Option<&str>,
    timeout: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    spidriver_shell::run_shell(port, timeout)?;
    Ok(())
}
