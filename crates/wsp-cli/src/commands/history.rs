//! History command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use wsp_core::HistoryOptions;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, HistoryRow, format_easyweather_line, format_history_csv, format_history_json,
    format_history_text,
};
use crate::style;
use crate::template::{RenderContext, Template};
use crate::util::{now_local, open_station, read_settings, write_output};

/// Everything the history command needs, resolved from flags and config.
pub struct HistoryRequest<'a> {
    pub infile: &'a Path,
    /// Newest records to print; `None` prints all of them.
    pub count: Option<u16>,
    pub format: OutputFormat,
    pub template: Option<&'a str>,
    pub quick_rain: bool,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub fn cmd_history(request: HistoryRequest<'_>) -> Result<()> {
    let HistoryRequest {
        infile,
        count,
        format,
        template,
        quick_rain,
        output,
        quiet,
        opts,
    } = request;

    // Parse the template upfront to fail fast
    let template = template.map(Template::parse).transpose()?;

    let mut station = open_station(infile)?;
    let settings = read_settings(&mut station)?;

    let options = HistoryOptions::new().quick_rain(quick_rain);
    let options = match count {
        Some(count) => options.count(count),
        None => options.all(),
    };
    let total = options.records_to_read(settings.data_count);

    // Progress only pays off for long walks
    let pb = (!quiet && total > 100).then(|| style::history_progress_bar(u64::from(total)));
    let pb_for_callback = pb.clone();
    let options = match pb_for_callback {
        Some(pb) => options.with_progress(move |progress| {
            pb.set_position(progress.records_read as u64);
        }),
        None => options,
    };

    let history = station
        .read_history(&settings, &options)
        .context("Failed to read history")?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    if history.missing() > 0 {
        warn!(
            "{} of {} records could not be read and are skipped",
            history.missing(),
            history.len()
        );
    }
    info!(
        "Read {} records{}",
        history.len(),
        if history.quick_rain() { " (quick rain)" } else { "" }
    );

    let needs_rain = match &template {
        Some(template) => template.needs_rain(),
        None => format != OutputFormat::Easyweather,
    };

    let mut rows = Vec::with_capacity(history.len());
    for (position, slot) in history.slots().iter().enumerate() {
        let Some(item) = slot else { continue };
        let rain = needs_rain.then(|| station.rain_totals(&history, position));
        rows.push(HistoryRow { item: *item, rain });
    }

    let content = match (&template, format) {
        (Some(template), _) => rows
            .iter()
            .map(|row| {
                let ctx = RenderContext {
                    altitude: opts.altitude,
                    rain: row.rain.unwrap_or_default(),
                };
                template.render(&row.item, &ctx)
            })
            .collect::<String>(),
        (None, OutputFormat::Easyweather) => {
            let now = now_local();
            rows.iter()
                .map(|row| format_easyweather_line(&row.item, now))
                .collect::<String>()
        }
        (None, OutputFormat::Json) => format_history_json(&rows, opts)?,
        (None, OutputFormat::Csv) => format_history_csv(&rows, opts),
        (None, OutputFormat::Text) => format_history_text(&rows, opts),
    };

    write_output(output, &content)?;
    Ok(())
}
