//! Dump command implementation.

use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing::info;
use wsp_core::layout::MEMORY_SIZE;

use crate::style;
use crate::util::open_station;

pub fn cmd_dump(
    infile: &Path,
    path: &Path,
    force: bool,
    quiet: bool,
    no_color: bool,
) -> Result<()> {
    if path.exists() && fs::canonicalize(path).ok() == fs::canonicalize(infile).ok() {
        bail!("Refusing to dump {} onto itself.", infile.display());
    }
    if path.exists() && !force {
        if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
            bail!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            );
        }
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} already exists. Overwrite?", path.display()))
            .default(false)
            .interact()
            .context("Failed to get user confirmation")?;
        if !overwrite {
            eprintln!("Dump cancelled.");
            return Ok(());
        }
    }

    let mut station = open_station(infile)?;
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    let pb = (!quiet).then(|| style::dump_progress_bar(MEMORY_SIZE as u64));
    let callback = pb.clone().map(|pb| -> wsp_core::DumpCallback {
        Arc::new(move |progress| pb.set_position(progress.bytes_written as u64))
    });

    let written = station
        .dump(BufWriter::new(file), callback)
        .with_context(|| format!("Failed to dump memory to {}", path.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    info!("Wrote {} bytes to {}", written, path.display());
    if !quiet {
        eprintln!(
            "{}",
            style::format_success(
                &format!("Wrote {} bytes to {}", written, path.display()),
                no_color
            )
        );
    }
    Ok(())
}
