//! Settings block reports: summary, status, settings, alarms, maxmin.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use wsp_core::HistoryOptions;

use crate::format::{
    FormatOptions, format_alarms_text, format_maxmin_text, format_settings_text,
    format_status_text, format_summary_text,
};
use crate::util::{open_station, read_settings, write_output};

/// Which settings block report to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Status,
    Settings,
    Alarms,
    Maxmin,
}

pub fn cmd_report(
    report: Report,
    infile: &Path,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let mut station = open_station(infile)?;
    let settings = read_settings(&mut station)?;

    let content = match report {
        Report::Status => format_status_text(&settings, opts),
        Report::Settings => format_settings_text(&settings, opts),
        Report::Alarms => format_alarms_text(&settings, opts),
        Report::Maxmin => format_maxmin_text(&settings, opts),
    };

    write_output(output, &content)?;
    Ok(())
}

pub fn cmd_summary(infile: &Path, output: Option<&PathBuf>, opts: &FormatOptions) -> Result<()> {
    let mut station = open_station(infile)?;
    let settings = read_settings(&mut station)?;

    if settings.data_count == 0 {
        bail!("The station has no stored records yet.");
    }

    let history = station
        .read_history(&settings, &HistoryOptions::new().count(1))
        .context("Failed to read the newest record")?;
    let Some(newest) = history.newest() else {
        bail!(
            "The newest record at 0x{:04X} could not be read.",
            settings.current_pos
        );
    };

    write_output(output, &format_summary_text(newest, opts))?;
    Ok(())
}
