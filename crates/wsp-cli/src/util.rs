//! Utility functions for CLI operations.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use time::{OffsetDateTime, UtcOffset};
use tracing::debug;

use wsp_core::{DumpFile, Station, StationSettings};

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = output {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        print!("{}", content);
        io::stdout().flush()?;
    }
    Ok(())
}

/// Open a memory dump as a read-only station.
pub fn open_station(path: &Path) -> Result<Station<DumpFile>> {
    debug!("Opening memory dump {}", path.display());
    if !path.exists() {
        bail!(
            "Memory dump not found: {}\n\
             Use --infile <PATH> or set WSP_INFILE.",
            path.display()
        );
    }
    let dump = DumpFile::open(path)
        .with_context(|| format!("Failed to open memory dump {}", path.display()))?;
    Ok(Station::new(dump))
}

/// Read the settings block of an opened dump.
pub fn read_settings(station: &mut Station<DumpFile>) -> Result<StationSettings> {
    station
        .read_settings()
        .context("Failed to read the settings block (is this a station memory dump?)")
}

/// Current local time, falling back to UTC when the offset is unknown.
pub fn now_local() -> OffsetDateTime {
    let local = chrono::Local::now();
    let offset =
        UtcOffset::from_whole_seconds(local.offset().local_minus_utc()).unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}
