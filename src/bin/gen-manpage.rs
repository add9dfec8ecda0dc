//! Man page generator for spidriver
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]
//!
//! Writes `spidriver.1` plus one page per subcommand (`spidriver-status.1`, ...).

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn render(man: clap_mangen::Man, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(path, buffer)
}

/// Page for one subcommand, titled `spidriver-<name>`
fn subcommand_page(sub: &clap::Command) -> (String, clap_mangen::Man) {
    let name = format!("spidriver-{}", sub.get_name());
    let man = clap_mangen::Man::new(sub.clone()).title(name.clone());
    (name, man)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    for sub in cmd.get_subcommands() {
        let (name, man) = subcommand_page(sub);
        render(man, &output_dir.join(format!("{}.1", name)))?;
    }

    let output_path = output_dir.join("spidriver.1");
    render(clap_mangen::Man::new(cmd), &output_path)?;

    println!("Man page generated at: {}", output_path.display());
    println!("\nTo view the man page:");
    println!("  man -l {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcommand_pages_render() {
        let cmd = cli::Cli::command();
        for sub in cmd.get_subcommands() {
            let (name, man) = subcommand_page(sub);
            assert!(name.starts_with("spidriver-"));
            let mut buffer = Vec::new();
            man.render(&mut buffer).unwrap();
            let page = String::from_utf8(buffer).unwrap();
            assert!(page.contains(sub.get_name()));
        }
    }
}
