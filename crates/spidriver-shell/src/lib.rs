//! Interactive shell for serial-to-SPI bridge gadgets
//!
//! A small line-oriented command shell over [`spidriver_core::Device`].
//!
//! # Example Session
//!
//! ```text
//! spi> connect /dev/ttyUSB0
//! Connected successfully
//! spi> cs on
//! spi> xfer 9f 00 00 00
//! FF EF 40 18
//! spi> cs
//! CS: false
//! ```

mod command;
mod error;

pub use command::{parse_line, ShellCommand};
pub use error::ShellError;

use colored::Colorize;
use directories::ProjectDirs;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use spidriver_core::{open_device, BoxedDevice};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What the loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands
    Continue,
    /// Leave the shell
    Quit,
}

/// Shell state: the connected device, if any
pub struct Shell {
    device: Option<BoxedDevice>,
    port: Option<String>,
    timeout: Option<Duration>,
}

impl Shell {
    /// Create a shell with no device
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            device: None,
            port: None,
            timeout,
        }
    }

    /// Connect to `port`, replacing the current device only on success
    ///
    /// Naming the port already in use reruns the connection test on it.
    pub fn connect(&mut self, port: &str) -> Result<(), ShellError> {
        if self.port.as_deref() == Some(port) {
            if let Some(device) = &self.device {
                device.connect()?;
                return Ok(());
            }
        }

        let device = open_device(port, self.timeout)?;
        if let Err(e) = device.connect() {
            device.close();
            return Err(e.into());
        }
        if let Some(old) = self.device.replace(device) {
            old.close();
        }
        self.port = Some(port.to_string());
        Ok(())
    }

    /// Connected device
    pub fn device(&self) -> Option<&BoxedDevice> {
        self.device.as_ref()
    }

    fn connected(&self) -> Result<&BoxedDevice, ShellError> {
        self.device.as_ref().ok_or(ShellError::NotConnected)
    }

    /// Run one command, writing its output to `out`
    pub fn execute(&mut self, cmd: ShellCommand, out: &mut dyn Write) -> Result<Flow, ShellError> {
        match cmd {
            ShellCommand::Empty => {}
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Help => print_help(out)?,
            ShellCommand::Connect(port) => {
                self.connect(&port)?;
                writeln!(out, "Connected successfully")?;
            }
            ShellCommand::Output(output, value) => {
                let device = self.connected()?;
                match value {
                    Some(enable) => device.set_output(output, enable)?,
                    None => {
                        let current = device.output(output)?;
                        device.set_output(output, !current)?;
                        writeln!(out, "{}: {}", output, !current)?;
                    }
                }
            }
            ShellCommand::Status => {
                let status = self.connected()?.status()?;
                writeln!(out, "{}", status)?;
            }
            ShellCommand::Read(count) => {
                let device = self.connected()?;
                let mut data = vec![0u8; count];
                device.read(&mut data)?;
                writeln!(out, "{}", hex_line(&data))?;
            }
            ShellCommand::WriteFile(path) => {
                let device = self.connected()?;
                if !path.is_file() {
                    return Err(ShellError::InvalidArgument(format!(
                        "file {} does not exist",
                        path.display()
                    )));
                }
                let data = std::fs::read(&path)?;
                let start = Instant::now();
                device.write(&data)?;
                writeln!(
                    out,
                    "Wrote {} bytes in {:.3}s",
                    data.len(),
                    start.elapsed().as_secs_f64()
                )?;
            }
            ShellCommand::Transfer(tx) => {
                let device = self.connected()?;
                let mut rx = vec![0u8; tx.len()];
                device.read_write(&mut rx, &tx)?;
                writeln!(out, "{}", hex_line(&rx))?;
            }
        }
        Ok(Flow::Continue)
    }
}

/// Format bytes as space-separated hex
pub fn hex_line(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Get the history file path
fn get_history_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "spidriver") {
        let mut path = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&path).ok();
        path.push("shell_history");
        path
    } else {
        PathBuf::from(".spidriver_history")
    }
}

fn print_help(out: &mut dyn Write) -> std::io::Result<()> {
    let entries = [
        ("connect <port>", "connect to serial port (or 'dummy')"),
        ("a [on/off]", "toggle or set A output"),
        ("b [on/off]", "toggle or set B output"),
        ("cs [on/off]", "toggle or set CS output"),
        ("status", "get device status"),
        ("read <count>", "read bytes from SPI"),
        ("writef <path>", "write file to SPI"),
        ("xfer <hex...>", "full-duplex transfer"),
        ("quit", "leave the shell"),
    ];
    for (cmd, text) in entries {
        writeln!(out, "{:<16} - {}", cmd.bright_cyan(), text)?;
    }
    Ok(())
}

/// Run the interactive shell until `quit` or end of input
pub fn run_shell(port: Option<&str>, timeout: Option<Duration>) -> Result<(), ShellError> {
    let mut shell = Shell::new(timeout);
    if let Some(port) = port {
        shell.connect(port)?;
        println!("Connected successfully");
    }

    let mut rl = DefaultEditor::new().map_err(|e| ShellError::Readline(e.to_string()))?;

    let history_path = get_history_path();
    if rl.load_history(&history_path).is_err() {
        log::debug!("shell: no history at {}", history_path.display());
    }

    println!(
        "Type {} for available commands, {} to exit.",
        "help".bright_cyan(),
        "quit".bright_cyan()
    );

    let prompt = format!("{} ", "spi>".bright_green().bold());
    let mut stdout = std::io::stdout();

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                let result = parse_line(&line).and_then(|cmd| shell.execute(cmd, &mut stdout));
                match result {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => eprintln!("{}: {}", "Error".bright_red().bold(), e),
                }
                let _ = stdout.flush();
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}: {:?}", "Error".bright_red().bold(), err);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        eprintln!(
            "{}: Failed to save history: {}",
            "Warning".bright_yellow(),
            e
        );
    }

    if let Some(device) = shell.device.take() {
        device.close();
    }

    Ok(())
}
