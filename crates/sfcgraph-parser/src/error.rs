//! Diagnostics reported while reading S7-GRAPH sources.
//!
//! Every problem found in the source text is described by a [`Diagnostic`]:
//! a severity, an optional [`ErrorCode`], a message, labelled [`Span`]s and
//! help text. Phases accumulate diagnostics in a [`DiagnosticCollector`]
//! instead of stopping at the first problem, and a failing phase returns
//! all of its diagnostics wrapped in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use sfcgraph_parser::error::{Diagnostic, ErrorCode};
//! # use sfcgraph_parser::Span;
//! let diag = Diagnostic::error("step `S2` is declared more than once")
//!     .with_code(ErrorCode::E201)
//!     .with_label(Span::new(120..131), "duplicate declaration")
//!     .with_secondary_label(Span::new(40..51), "first declared here")
//!     .with_help("rename one of the steps");
//!
//! assert_eq!(diag.to_string(), "error[E201]: step `S2` is declared more than once");
//! ```
//!
//! [`Span`]: crate::Span

mod collector;
mod diagnostic;
mod error_code;

pub(crate) use collector::DiagnosticCollector;

pub use collector::ParseError;
pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
