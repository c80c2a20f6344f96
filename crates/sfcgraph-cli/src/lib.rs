//! CLI logic for the sfcgraph converter.
//!
//! This module contains the core CLI logic: loading configuration, running
//! the conversion and summarizing its outcome.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::path::Path;

use log::info;

use sfcgraph::{Converter, RunReport, SequenceOutcome, SfcGraphError};

/// Exit status of a run that skipped sequences or blocks.
pub const EXIT_PARTIAL: i32 = 2;

/// Run the sfcgraph CLI application
///
/// This function converts the input file and writes the resulting draw.io
/// file, either to the explicit output path or next to the input's
/// directory.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `SfcGraphError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Source that cannot be tokenized, or malformed blocks in strict mode
/// - Export errors
pub fn run(args: &Args) -> Result<RunReport, SfcGraphError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing sequences"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let converter = Converter::new(app_config);
    let output = args.output.as_deref().map(Path::new);
    let report = converter.convert_file(Path::new(&args.input), output)?;

    info!(
        output_file = report.output.display().to_string(),
        complete = report.is_complete();
        "draw.io file exported"
    );

    Ok(report)
}

/// One line per sequence, followed by the output location.
pub fn summary(report: &RunReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .sequences
        .iter()
        .map(|sequence| match &sequence.outcome {
            SequenceOutcome::Rendered { shapes, edges } => {
                format!("{}: rendered ({shapes} steps, {edges} edges)", sequence.name)
            }
            SequenceOutcome::Skipped(failure) => {
                format!("{}: skipped: {failure}", sequence.name)
            }
        })
        .collect();

    if report.lossy {
        lines.push(format!(
            "{}: input is not valid UTF-8, invalid bytes were replaced",
            report.input.display()
        ));
    }
    lines.push(format!(
        "wrote {} of {} sequences to {}",
        report.rendered_count(),
        report.sequences.len(),
        report.output.display()
    ));
    lines
}
