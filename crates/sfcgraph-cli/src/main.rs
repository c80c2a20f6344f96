//! sfcgraph CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use sfcgraph_cli::{
    Args, EXIT_PARTIAL,
    error_adapter::{report_reportables, to_reportables},
    summary,
};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting sfcgraph");
    debug!(args:?; "Parsed arguments");

    let reporter = miette::GraphicalReportHandler::new();

    let report = match sfcgraph_cli::run(&args) {
        Ok(report) => report,
        Err(err) => {
            // Render each diagnostic independently
            for reportable in to_reportables(&err) {
                let mut writer = String::new();
                reporter
                    .render_report(&mut writer, &reportable)
                    .expect("Writing to String buffer is infallible");

                error!("{writer}");
            }

            process::exit(1);
        }
    };

    for reportable in report_reportables(&report) {
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &reportable)
            .expect("Writing to String buffer is infallible");

        eprintln!("{writer}");
    }

    for line in summary(&report) {
        println!("{line}");
    }

    if !report.is_complete() {
        warn!(
            rendered = report.rendered_count(),
            sequences = report.sequences.len();
            "Completed with skipped sequences or blocks"
        );
        process::exit(EXIT_PARTIAL);
    }

    info!("Completed successfully");
}
