//! # sfcgraph Parser
//!
//! Reads the textual export of S7-GRAPH function blocks (`.gr7` files) and
//! extracts the sequences, steps and transitions they declare.
//!
//! ## Usage
//!
//! ```
//! # use sfcgraph_parser::{parse, validate_sequence, ParseOptions, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//! FUNCTION_BLOCK FB_Clamp
//! (*$_COM Clamp
//! Close the clamp*)
//! (*$_CMPSET 1*)
//! (*$_SETTINGS Standard*)
//! INITIAL_STEP S1 (*$_NUM 1*): (*$_COM Open*)
//! END_STEP
//! STEP S2 (*$_NUM 2*): (*$_COM Closed*)
//! END_STEP
//! TRANSITION T1 (*$_NUM 1*)
//! FROM S1 TO S2
//! CONDITION := "xClose"
//! END_TRANSITION
//! END_FUNCTION_BLOCK
//! "#;
//!
//!     let parsed = parse(source, ParseOptions::default())?;
//!     assert_eq!(parsed.sequences.len(), 1);
//!
//!     let clamp = &parsed.sequences[0];
//!     validate_sequence(clamp)?;
//!     assert_eq!(clamp.sequence.steps.len(), 2);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod parser;
#[cfg(test)]
mod parser_tests;
mod span;
mod tokens;
mod validate;

pub use parser::{ParseOptions, ParsedSequence, ParsedSource, SequenceSpans, TransitionSpans};
pub use span::{Span, Spanned};
pub use validate::validate_sequence;

use log::info;

use error::ParseError;

/// Extract every sequence from S7-GRAPH source text.
///
/// The pipeline is:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Extract** - Split program units and read sequence, step and
///    transition blocks
///
/// Sequences are not validated; call [`validate_sequence`] on each before
/// laying it out.
///
/// # Errors
///
/// Fails when the source cannot be tokenized, or in strict mode when any
/// block is malformed. Otherwise malformed blocks are skipped and reported
/// in [`ParsedSource::diagnostics`].
pub fn parse(source: &str, options: ParseOptions) -> Result<ParsedSource, ParseError> {
    info!(bytes = source.len(), strict = options.strict; "Extracting sequences");

    // Step 1: Tokenize
    let tokens: Vec<_> = lexer::tokenize(source)?
        .into_iter()
        .filter(|token| !token.is_trivia())
        .collect();

    // Step 2: Extract
    let parsed = parser::extract(source, &tokens, options)?;

    info!(
        sequences = parsed.sequences.len(),
        warnings = parsed.diagnostics.len();
        "Extraction finished"
    );
    Ok(parsed)
}
