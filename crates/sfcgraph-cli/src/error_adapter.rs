//! miette rendering for conversion failures and recovered diagnostics.
//!
//! Diagnostics from the parser and validator point into the `.gr7` text and
//! are rendered with source excerpts. Run-level failures (unreadable input,
//! unwritable output, bad configuration) have no location and are rendered
//! with a `sfcgraph::` code only.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use sfcgraph::{RunReport, SequenceFailure, SequenceOutcome, SfcGraphError};
use sfcgraph_parser::error::{Diagnostic, Label, Severity};

/// One report handed to miette's graphical handler.
pub enum Reportable<'a> {
    /// A diagnostic located in the converted source.
    InSource {
        diag: &'a Diagnostic,
        src: &'a str,
    },
    /// A failure of the run as a whole.
    Run(&'a SfcGraphError),
}

impl<'a> Reportable<'a> {
    pub fn in_source(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self::InSource { diag, src }
    }
}

impl fmt::Debug for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InSource { diag, .. } => f.debug_tuple("InSource").field(diag).finish(),
            Self::Run(err) => f.debug_tuple("Run").field(err).finish(),
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InSource { diag, .. } => f.write_str(diag.message()),
            Self::Run(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InSource { .. } => None,
            Self::Run(err) => std::error::Error::source(*err),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Self::InSource { diag, .. } => diag.code().map(|code| Box::new(code) as Box<dyn fmt::Display + 'a>),
            Self::Run(err) => run_code(err).map(|code| Box::new(code) as Box<dyn fmt::Display + 'a>),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        let Self::InSource { diag, .. } = self else {
            return Some(MietteSeverity::Error);
        };
        Some(match diag.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Self::InSource { diag, .. } => diag.help().map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>),
            Self::Run(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Self::InSource { src, .. } => Some(src as &dyn miette::SourceCode),
            Self::Run(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Self::InSource { diag, .. } = self else {
            return None;
        };
        if diag.labels().is_empty() {
            return None;
        }
        Some(Box::new(diag.labels().iter().map(labeled_span)))
    }
}

/// Code of a run-level failure. Parse failures carry their own codes.
fn run_code(err: &SfcGraphError) -> Option<&'static str> {
    match err {
        SfcGraphError::Io(_) => Some("sfcgraph::io"),
        SfcGraphError::Parse { .. } => None,
        SfcGraphError::Export(_) => Some("sfcgraph::export"),
    }
}

fn labeled_span(label: &Label) -> LabeledSpan {
    let span = SourceSpan::new(label.span().start().into(), label.span().len());
    let message = Some(label.message().to_string());
    if label.is_primary() {
        LabeledSpan::new_primary_with_span(message, span)
    } else {
        LabeledSpan::new_with_span(message, span)
    }
}

/// Reports for a failed run.
///
/// A [`SfcGraphError::Parse`] yields one report per diagnostic, so a source
/// with several lexer errors shows all of them.
pub fn to_reportables(err: &SfcGraphError) -> Vec<Reportable<'_>> {
    match err {
        SfcGraphError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diag| Reportable::in_source(diag, src))
            .collect(),
        _ => vec![Reportable::Run(err)],
    }
}

/// Reports for a finished run.
///
/// Extraction warnings come first, followed by the diagnostics of each
/// sequence in file order: structural warnings of rendered sequences and the
/// violations that caused a sequence to be skipped.
pub fn report_reportables(report: &RunReport) -> Vec<Reportable<'_>> {
    let src = report.source.as_str();
    let per_sequence = report.sequences.iter().flat_map(|sequence| {
        let failure: &[Diagnostic] = match &sequence.outcome {
            SequenceOutcome::Skipped(SequenceFailure::Invalid(err)) => err.diagnostics(),
            _ => &[],
        };
        sequence.warnings.iter().chain(failure)
    });

    report
        .diagnostics
        .iter()
        .chain(per_sequence)
        .map(|diag| Reportable::in_source(diag, src))
        .collect()
}
