//! Configuration types for sequence conversion.
//!
//! This module provides the configuration structures that control how
//! sources are parsed, how sequences are laid out and how the resulting
//! diagram looks. All types implement [`serde::Deserialize`] so that they
//! can be loaded from external sources; every section falls back to its
//! defaults when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`ParseConfig`] - Extraction strictness.
//! - [`LayoutConfig`] - Which [`EngineKind`] is used and how roots are chosen.
//! - [`DiagramConfig`] - Geometry and labelling of the emitted diagram.
//! - [`OutputConfig`] - Where the diagram file is written.
//!
//! # Example
//!
//! ```
//! # use sfcgraph::config::{AppConfig, EngineKind, LabelStrategy};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().engine(), EngineKind::Layered);
//! assert_eq!(config.diagram().label(), LabelStrategy::Number);
//! assert_eq!(config.output().directory(), "Parsed_Data");
//! ```

use serde::Deserialize;

/// Top-level configuration combining every section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Parse configuration section.
    #[serde(default)]
    parse: ParseConfig,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Diagram configuration section.
    #[serde(default)]
    diagram: DiagramConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        parse: ParseConfig,
        layout: LayoutConfig,
        diagram: DiagramConfig,
        output: OutputConfig,
    ) -> Self {
        Self {
            parse,
            layout,
            diagram,
            output,
        }
    }

    /// Returns the parse configuration.
    pub fn parse(&self) -> &ParseConfig {
        &self.parse
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the diagram configuration.
    pub fn diagram(&self) -> &DiagramConfig {
        &self.diagram
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ParseConfig {
    /// Fail on the first malformed block instead of skipping it.
    #[serde(default)]
    strict: bool,
}

impl ParseConfig {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn strict(&self) -> bool {
        self.strict
    }
}

/// Available layout engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Layered placement following the transition graph.
    #[default]
    Layered,
    /// Steps in source order, stacked into fixed-height columns.
    Columns,
}

/// How the layered engine picks the step it starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// Exactly one step without incoming transitions is required.
    #[default]
    Strict,
    /// Fall back to the initial step, or the first declared step.
    FirstDeclared,
}

/// Layout engine configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LayoutConfig {
    /// The [`EngineKind`] used for every sequence.
    #[serde(default)]
    engine: EngineKind,

    /// Root selection for [`EngineKind::Layered`].
    #[serde(default)]
    root: RootPolicy,
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    ///
    /// # Arguments
    ///
    /// * `engine` - Layout engine used for every sequence.
    /// * `root` - Root selection policy of the layered engine.
    pub fn new(engine: EngineKind, root: RootPolicy) -> Self {
        Self { engine, root }
    }

    /// Returns the configured [`EngineKind`].
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Returns the configured [`RootPolicy`].
    pub fn root(&self) -> RootPolicy {
        self.root
    }
}

/// What a step shape displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelStrategy {
    /// The declared step number.
    #[default]
    Number,
    /// The step name.
    Name,
    /// `"<name> - <comment>"`.
    NameComment,
}

/// Geometry and content of the emitted diagram.
///
/// Coordinates are in draw.io units. A shape at `(layer, row)` is placed at
/// `x = origin_x + layer * spacing_x` and `y = origin_y + row * spacing_y`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    emit_edges: bool,
    label: LabelStrategy,
    origin_x: u32,
    origin_y: u32,
    spacing_x: u32,
    spacing_y: u32,
    width: u32,
    height: u32,
    /// Lowest `y` a shape may take in [`EngineKind::Columns`] before a new
    /// column is started.
    column_height: u32,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            emit_edges: true,
            label: LabelStrategy::Number,
            origin_x: 100,
            origin_y: 100,
            spacing_x: 200,
            spacing_y: 150,
            width: 80,
            height: 40,
            column_height: 500,
        }
    }
}

impl DiagramConfig {
    /// Returns a copy with edges switched on or off.
    pub fn with_edges(mut self, emit_edges: bool) -> Self {
        self.emit_edges = emit_edges;
        self
    }

    /// Returns a copy using the given [`LabelStrategy`].
    pub fn with_label(mut self, label: LabelStrategy) -> Self {
        self.label = label;
        self
    }

    /// Returns a copy with a different column height.
    pub fn with_column_height(mut self, column_height: u32) -> Self {
        self.column_height = column_height;
        self
    }

    pub fn emit_edges(&self) -> bool {
        self.emit_edges
    }

    pub fn label(&self) -> LabelStrategy {
        self.label
    }

    pub fn origin(&self) -> (u32, u32) {
        (self.origin_x, self.origin_y)
    }

    pub fn spacing(&self) -> (u32, u32) {
        (self.spacing_x, self.spacing_y)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn column_height(&self) -> u32 {
        self.column_height
    }
}

/// Location of the generated diagram file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory, relative to the parent of the input's directory.
    directory: String,
    /// Appended to the input's file stem.
    suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "Parsed_Data".to_string(),
            suffix: "GR7".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn new(directory: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            suffix: suffix.into(),
        }
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_defaults() {
        let diagram = DiagramConfig::default();

        assert!(diagram.emit_edges());
        assert_eq!(diagram.origin(), (100, 100));
        assert_eq!(diagram.spacing(), (200, 150));
        assert_eq!(diagram.size(), (80, 40));
        assert_eq!(diagram.column_height(), 500);
    }

    #[test]
    fn test_layout_defaults() {
        let layout = LayoutConfig::default();

        assert_eq!(layout.engine(), EngineKind::Layered);
        assert_eq!(layout.root(), RootPolicy::Strict);
    }

    #[test]
    fn test_output_defaults() {
        let output = OutputConfig::default();

        assert_eq!(output.directory(), "Parsed_Data");
        assert_eq!(output.suffix(), "GR7");
    }

    #[test]
    fn test_builders() {
        let diagram = DiagramConfig::default()
            .with_edges(false)
            .with_label(LabelStrategy::NameComment)
            .with_column_height(300);

        assert!(!diagram.emit_edges());
        assert_eq!(diagram.label(), LabelStrategy::NameComment);
        assert_eq!(diagram.column_height(), 300);
        assert_eq!(diagram.size(), (80, 40));
    }
}
