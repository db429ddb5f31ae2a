use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use wsp_cli::cli::{Cli, Commands};
use wsp_cli::commands::{
    HistoryRequest, Report, cmd_config, cmd_dump, cmd_history, cmd_report, cmd_summary,
};
use wsp_cli::config::{Config, resolve_altitude, resolve_infile};
use wsp_cli::format::FormatOptions;
use wsp_cli::template::directive_list;
use wsp_cli::util::write_output;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "wsp", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else {
        match cli.verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let altitude = resolve_altitude(cli.source.altitude, &config);
    let opts = FormatOptions::new(cli.no_color || config.no_color, cli.style).with_altitude(altitude);
    let output = cli.output.as_ref();
    if let Some(path) = output {
        tracing::debug!("Output will be written to: {}", path.display());
    }

    let infile = || resolve_infile(cli.source.infile.clone(), &config);

    match cli.command.unwrap_or(Commands::Summary) {
        Commands::Summary => cmd_summary(&infile()?, output, &opts),
        Commands::Status => cmd_report(Report::Status, &infile()?, output, &opts),
        Commands::Settings => cmd_report(Report::Settings, &infile()?, output, &opts),
        Commands::Alarms => cmd_report(Report::Alarms, &infile()?, output, &opts),
        Commands::Maxmin => cmd_report(Report::Maxmin, &infile()?, output, &opts),
        Commands::History(args) => {
            let format = args
                .format
                .or_else(|| config.output_format())
                .unwrap_or_default();
            let opts = opts
                .with_no_header(args.no_header)
                .with_compact(args.compact);
            cmd_history(HistoryRequest {
                infile: &infile()?,
                count: (!args.all && args.count != 0).then_some(args.count),
                format,
                template: args.template.as_deref(),
                quick_rain: args.quick_rain || config.quick_rain,
                output,
                quiet: cli.quiet,
                opts: &opts,
            })
        }
        Commands::FormatList => write_output(output, &directive_list()),
        Commands::Dump { path, force } => {
            cmd_dump(&infile()?, &path, force, cli.quiet, opts.no_color)
        }
        Commands::Config { action } => cmd_config(action, opts.no_color),
        // Already handled above
        Commands::Completions { .. } => Ok(()),
    }
}
