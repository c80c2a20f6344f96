//! Structural checks on an extracted sequence.
//!
//! Extraction only checks that each block is well formed on its own. The
//! checks here look at a sequence as a whole: every transition endpoint must
//! name a declared step, step names must be unique, and at least one step
//! should be free of incoming transitions so that a diagram has somewhere
//! to start.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use sfcgraph_core::identifier::Id;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser::ParsedSequence,
    span::Span,
};

/// Validate one sequence.
///
/// Returns the warnings when the sequence can be laid out, otherwise a
/// [`ParseError`] holding every violation.
pub fn validate_sequence(parsed: &ParsedSequence) -> Result<Vec<Diagnostic>, ParseError> {
    let sequence = &parsed.sequence;
    let spans = &parsed.spans;
    let mut collector = DiagnosticCollector::new();

    // Unique step names
    let mut declared: IndexMap<Id, Span> = IndexMap::new();
    for (idx, step) in sequence.steps.iter().enumerate() {
        let span = spans.steps.get(idx).copied().unwrap_or_default();
        if let Some(first) = declared.get(&step.name) {
            collector.emit(
                Diagnostic::error(format!("step `{}` is declared more than once", step.name))
                    .with_code(ErrorCode::E201)
                    .with_label(span, "duplicate declaration")
                    .with_secondary_label(*first, "first declared here")
                    .with_help("step names must be unique within a sequence"),
            );
        } else {
            declared.insert(step.name, span);
        }
    }

    // Resolved endpoints
    for (idx, transition) in sequence.transitions.iter().enumerate() {
        let endpoint_spans = spans.transitions.get(idx);
        let from_spans = endpoint_spans.map(|s| s.from.as_slice()).unwrap_or_default();
        let to_spans = endpoint_spans.map(|s| s.to.as_slice()).unwrap_or_default();

        let endpoints = transition
            .from
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, from_spans.get(i)))
            .chain(
                transition
                    .to
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (*name, to_spans.get(i))),
            );

        for (name, span) in endpoints {
            if declared.contains_key(&name) {
                continue;
            }
            collector.emit(
                Diagnostic::error(format!(
                    "transition `{}` refers to undeclared step `{name}`",
                    transition.name
                ))
                .with_code(ErrorCode::E200)
                .with_label(
                    span.copied().unwrap_or_default(),
                    format!("not a step of sequence `{}`", sequence.name),
                )
                .with_help("declare the step or correct the name"),
            );
        }
    }

    // Root candidate
    if !sequence.steps.is_empty() {
        let targets: HashSet<Id> = sequence.edges().map(|(_, _, target)| target).collect();
        if sequence.steps.iter().all(|step| targets.contains(&step.name)) {
            collector.emit(
                Diagnostic::warning(format!(
                    "sequence `{}` has no step without incoming transitions",
                    sequence.name
                ))
                .with_code(ErrorCode::E202)
                .with_label(spans.header, "no root step")
                .with_help("layout falls back to the initial step only when configured to"),
            );
        }
    }

    let result = collector.finish();
    debug!(
        sequence = sequence.qualified_name(),
        valid = result.is_ok();
        "Validated sequence"
    );
    result
}
