//! Placement of sequence steps on a layer/row grid.
//!
//! A [`LayoutEngine`] turns a [`Sequence`] into a [`Layout`]: one
//! [`GraphNode`] per step carrying its layer (column) and row, plus the
//! expanded list of edges between them. Two engines are available:
//!
//! - [`LayeredEngine`] follows the transition graph from its root.
//! - [`ColumnEngine`] stacks steps in source order into fixed-height columns.
//!
//! [`EngineBuilder`] picks and configures the engine from an
//! [`AppConfig`].

mod columns;
mod layered;

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use sfcgraph_core::{identifier::Id, model::Sequence};

use crate::config::{AppConfig, DiagramConfig, EngineKind, RootPolicy};

pub use columns::ColumnEngine;
pub use layered::LayeredEngine;

/// Grid position of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphNode {
    pub step: Id,
    pub layer: usize,
    pub row: usize,
}

/// A `(source, target)` pair of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    /// Index of the owning transition in [`Sequence::transitions`].
    pub transition: usize,
    pub source: Id,
    pub target: Id,
}

/// Result of laying out one sequence.
///
/// Nodes are kept in step declaration order. Each `(source, target)` pair
/// appears once in [`Layout::edges`], attributed to the first transition
/// that declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    nodes: Vec<GraphNode>,
    edges: Vec<LayoutEdge>,
}

impl Layout {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<LayoutEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// Returns the node placed for `step`.
    pub fn node(&self, step: Id) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.step == step)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of layers in use.
    pub fn layer_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| node.layer + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Reasons a sequence cannot be laid out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error(
        "expected exactly one step without incoming transitions, found {}",
        .candidates.len()
    )]
    NoUniqueRoot { candidates: Vec<Id> },

    #[error("transitions form a cycle through {}", join(.cycle))]
    CyclicGraph { cycle: Vec<Id> },

    #[error("transition `{transition}` refers to undeclared step `{step}`")]
    UnknownStep { transition: Id, step: Id },
}

fn join(ids: &[Id]) -> String {
    ids.iter()
        .map(Id::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A strategy for placing the steps of a sequence.
pub trait LayoutEngine {
    /// Lays out `sequence`.
    ///
    /// An empty sequence yields an empty [`Layout`].
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when the sequence's shape does not suit the
    /// engine.
    fn layout(&self, sequence: &Sequence) -> Result<Layout, LayoutError>;
}

/// Builder that selects and configures a [`LayoutEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineBuilder {
    root_policy: RootPolicy,
    diagram: DiagramConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preconfigured from the layout and diagram sections.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new()
            .with_root_policy(config.layout().root())
            .with_diagram(*config.diagram())
    }

    /// Sets the root selection used by [`LayeredEngine`].
    pub fn with_root_policy(mut self, root_policy: RootPolicy) -> Self {
        self.root_policy = root_policy;
        self
    }

    /// Sets the geometry [`ColumnEngine`] fills its columns against.
    pub fn with_diagram(mut self, diagram: DiagramConfig) -> Self {
        self.diagram = diagram;
        self
    }

    /// Creates the engine of the given kind.
    pub fn build(&self, kind: EngineKind) -> Box<dyn LayoutEngine> {
        match kind {
            EngineKind::Layered => Box::new(LayeredEngine::new(self.root_policy)),
            EngineKind::Columns => {
                let (_, origin_y) = self.diagram.origin();
                let (_, spacing_y) = self.diagram.spacing();
                Box::new(ColumnEngine::new(
                    origin_y,
                    spacing_y,
                    self.diagram.column_height(),
                ))
            }
        }
    }
}

/// Distinct step names in declaration order, with their position in it.
///
/// A repeated name keeps its first position.
fn step_indices(sequence: &Sequence) -> (Vec<Id>, HashMap<Id, usize>) {
    let mut order = Vec::with_capacity(sequence.steps.len());
    let mut indices = HashMap::with_capacity(sequence.steps.len());
    for step in &sequence.steps {
        if !indices.contains_key(&step.name) {
            indices.insert(step.name, order.len());
            order.push(step.name);
        }
    }
    (order, indices)
}

/// Expands every transition into `(source, target)` pairs, keeping the
/// first occurrence of each pair.
fn expand_edges(
    sequence: &Sequence,
    indices: &HashMap<Id, usize>,
) -> Result<Vec<LayoutEdge>, LayoutError> {
    let mut edges = Vec::new();
    let mut seen = HashSet::new();
    for (transition, source, target) in sequence.edges() {
        for step in [source, target] {
            if !indices.contains_key(&step) {
                return Err(LayoutError::UnknownStep {
                    transition: sequence.transitions[transition].name,
                    step,
                });
            }
        }
        if !seen.insert((source, target)) {
            continue;
        }
        edges.push(LayoutEdge {
            transition,
            source,
            target,
        });
    }
    Ok(edges)
}
