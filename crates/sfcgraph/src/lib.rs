//! sfcgraph - Converts S7-GRAPH sequences into layered draw.io diagrams.
//!
//! Sequences are extracted from the textual export of S7-GRAPH function
//! blocks, checked, laid out on a layer/row grid and written as pages of a
//! draw.io file. Problems are reported per sequence: a sequence that cannot
//! be drawn is skipped without affecting its siblings.

pub mod config;
pub mod export;
pub mod layout;

mod error;

pub use sfcgraph_core::{identifier, model};
pub use sfcgraph_parser::error::{Diagnostic, ParseError};

pub use error::SfcGraphError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, trace, warn};
use thiserror::Error;

use sfcgraph_parser::{ParseOptions, ParsedSequence, validate_sequence};

use config::AppConfig;
use export::drawio::{DiagramDocument, DrawioFile};
use layout::{EngineBuilder, LayoutEngine, LayoutError};

/// Why a sequence was left out of the diagram.
#[derive(Debug, Clone, Error)]
pub enum SequenceFailure {
    /// Structural problems such as unresolved step references or
    /// duplicate step names.
    #[error("{0}")]
    Invalid(ParseError),

    /// The sequence cannot be laid out, e.g. it has no unique root or
    /// contains a cycle.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// What happened to one sequence.
#[derive(Debug, Clone)]
pub enum SequenceOutcome {
    Rendered { shapes: usize, edges: usize },
    Skipped(SequenceFailure),
}

impl SequenceOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, SequenceOutcome::Rendered { .. })
    }
}

/// Per-sequence entry of a [`Conversion`] or [`RunReport`].
#[derive(Debug, Clone)]
pub struct SequenceReport {
    /// `"<function block>/<sequence>"`.
    pub name: String,
    pub outcome: SequenceOutcome,
    /// Non-fatal findings of the structural checks.
    pub warnings: Vec<Diagnostic>,
}

/// Result of converting source text.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// One entry per sequence, in file order.
    pub sequences: Vec<SequenceReport>,
    /// Blocks the extractor skipped or had to assume.
    pub diagnostics: Vec<Diagnostic>,
    /// Pages of every rendered sequence.
    pub file: DrawioFile,
}

impl Conversion {
    /// `true` when every sequence rendered and nothing was skipped during
    /// extraction.
    pub fn is_complete(&self) -> bool {
        is_complete(&self.sequences, &self.diagnostics)
    }
}

/// Result of converting a file.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Decoded input text, for rendering diagnostics.
    pub source: String,
    /// The input was not valid UTF-8 and was decoded lossily.
    pub lossy: bool,
    pub sequences: Vec<SequenceReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// `true` when every sequence rendered and nothing was skipped during
    /// extraction.
    pub fn is_complete(&self) -> bool {
        is_complete(&self.sequences, &self.diagnostics)
    }

    pub fn rendered_count(&self) -> usize {
        self.sequences
            .iter()
            .filter(|report| report.outcome.is_rendered())
            .count()
    }
}

fn is_complete(sequences: &[SequenceReport], diagnostics: &[Diagnostic]) -> bool {
    diagnostics.is_empty() && sequences.iter().all(|report| report.outcome.is_rendered())
}

/// Drives the conversion of S7-GRAPH sources into draw.io files.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use sfcgraph::{Converter, config::AppConfig};
///
/// let converter = Converter::new(AppConfig::default());
/// let report = converter
///     .convert_file(Path::new("Sources/FB_Clamp.gr7"), None)
///     .expect("Failed to convert");
///
/// for sequence in &report.sequences {
///     println!("{}: {:?}", sequence.name, sequence.outcome);
/// }
/// ```
#[derive(Debug, Default)]
pub struct Converter {
    config: AppConfig,
}

impl Converter {
    /// Create a new converter with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Parse, layout, diagram and output settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Convert source text into a draw.io file held in memory.
    ///
    /// Every sequence is validated and laid out on its own; the ones that
    /// fail are reported as [`SequenceOutcome::Skipped`] and left out of the
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`SfcGraphError::Parse`] when the source cannot be tokenized,
    /// or in strict mode when a block is malformed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sfcgraph::Converter;
    ///
    /// let conversion = Converter::default().convert_source("").unwrap();
    /// assert!(conversion.sequences.is_empty());
    /// assert_eq!(conversion.file.page_count(), 0);
    /// ```
    pub fn convert_source(&self, source: &str) -> Result<Conversion, SfcGraphError> {
        info!("Parsing source");

        let options = ParseOptions {
            strict: self.config.parse().strict(),
        };
        let parsed = sfcgraph_parser::parse(source, options)
            .map_err(|err| SfcGraphError::new_parse_error(err, source))?;
        debug!(sequences = parsed.sequences.len(); "Source parsed");

        let engine = EngineBuilder::from_config(&self.config).build(self.config.layout().engine());
        let mut file = DrawioFile::new();
        let sequences = parsed
            .sequences
            .iter()
            .map(|sequence| self.convert_sequence(sequence, engine.as_ref(), &mut file))
            .collect();

        Ok(Conversion {
            sequences,
            diagnostics: parsed.diagnostics,
            file,
        })
    }

    /// Convert a `.gr7` file and write the diagram file.
    ///
    /// The diagram is written to `output` when given, otherwise to
    /// [`Converter::output_path`].
    ///
    /// # Errors
    ///
    /// Returns `SfcGraphError` when the input cannot be read, the source
    /// cannot be parsed or the output cannot be written.
    pub fn convert_file(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<RunReport, SfcGraphError> {
        info!(input:? = input; "Reading input");

        let bytes = fs::read(input)?;
        let (source, lossy) = match String::from_utf8(bytes) {
            Ok(source) => (source, false),
            Err(err) => {
                warn!(input:? = input; "Input is not valid UTF-8, decoding lossily");
                (String::from_utf8_lossy(err.as_bytes()).into_owned(), true)
            }
        };

        let conversion = self.convert_source(&source)?;

        let output = output.map_or_else(|| self.output_path(input), Path::to_path_buf);
        conversion.file.write(&output)?;

        let report = RunReport {
            input: input.to_path_buf(),
            output,
            source,
            lossy,
            sequences: conversion.sequences,
            diagnostics: conversion.diagnostics,
        };
        info!(
            output:? = report.output,
            rendered = report.rendered_count(),
            sequences = report.sequences.len();
            "Diagram written"
        );
        Ok(report)
    }

    /// Default location of the diagram for `input`:
    /// `<parent of the input's directory>/<directory>/<stem><suffix>.drawio`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let output = self.config.output();
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        let file_name = format!("{stem}{}.drawio", output.suffix());

        let input_dir = input.parent().unwrap_or_else(|| Path::new(""));
        let base = match input_dir.parent() {
            Some(parent) => parent.to_path_buf(),
            None if input_dir.as_os_str().is_empty() => PathBuf::from(".."),
            None => input_dir.to_path_buf(),
        };
        base.join(output.directory()).join(file_name)
    }

    fn convert_sequence(
        &self,
        parsed: &ParsedSequence,
        engine: &dyn LayoutEngine,
        file: &mut DrawioFile,
    ) -> SequenceReport {
        let name = parsed.sequence.qualified_name();
        let mut warnings = Vec::new();

        let outcome = match self.render(parsed, engine, &mut warnings) {
            Ok(document) => {
                let outcome = SequenceOutcome::Rendered {
                    shapes: document.shape_count(),
                    edges: document.edge_count(),
                };
                info!(sequence = name.as_str(); "Sequence rendered");
                file.add_page(name.as_str(), document);
                outcome
            }
            Err(failure) => {
                warn!(sequence = name.as_str(), reason:% = failure; "Sequence skipped");
                SequenceOutcome::Skipped(failure)
            }
        };

        SequenceReport {
            name,
            outcome,
            warnings,
        }
    }

    fn render(
        &self,
        parsed: &ParsedSequence,
        engine: &dyn LayoutEngine,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<DiagramDocument, SequenceFailure> {
        warnings.extend(validate_sequence(parsed).map_err(SequenceFailure::Invalid)?);

        let layout = engine.layout(&parsed.sequence)?;
        trace!(layout:?; "Sequence laid out");

        Ok(DiagramDocument::from_layout(
            &parsed.sequence,
            &layout,
            self.config.diagram(),
        ))
    }
}
