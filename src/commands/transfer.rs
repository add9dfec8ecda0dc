//! Bulk read, write and full-duplex transfer commands

use crate::cli::{parse_hex_bytes, PortArgs};
use indicatif::{ProgressBar, ProgressStyle};
use spidriver_core::BoxedDevice;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Bytes handed to the device per call while showing progress
const WRITE_CHUNK_SIZE: usize = 4096;

/// Format `data` as a classic hex dump, 16 bytes per line
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in data.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!("{:08x}: {:<47}  {}\n", line * 16, hex.join(" "), ascii));
    }
    out
}

/// Run the read command
pub fn run_read(
    args: &PortArgs,
    count: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let device = super::connect(args)?;
    let mut data = vec![0u8; count];
    device.read(&mut data)?;
    device.close();

    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(&data)?;
            println!("Wrote {} bytes to {:?}", data.len(), path);
        }
        None => print!("{}", hex_dump(&data)),
    }
    Ok(())
}

/// Write `data` in pieces, advancing a progress bar
pub fn write_with_progress(
    device: &BoxedDevice,
    data: &[u8],
) -> Result<usize, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(data.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut written = 0;
    for chunk in data.chunks(WRITE_CHUNK_SIZE) {
        written += device.write(chunk)?;
        pb.set_position(written as u64);
    }
    device.flush()?;
    pb.finish_and_clear();
    Ok(written)
}

/// Run the write command
pub fn run_write(args: &PortArgs, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let device = super::connect(args)?;

    let start = Instant::now();
    let written = write_with_progress(&device, &data)?;
    device.close();

    println!(
        "Wrote {} bytes in {:.3}s",
        written,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Run the full-duplex transfer command
pub fn run_transfer(args: &PortArgs, data: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let tx = parse_hex_bytes(&data.join(" "))?;
    let device = super::connect(args)?;
    let mut rx = vec![0u8; tx.len()];
    device.read_write(&mut rx, &tx)?;
    device.close();

    let hex: Vec<String> = rx.iter().map(|b| format!("{:02X}", b)).collect();
    println!("{}", hex.join(" "));
    Ok(())
}
