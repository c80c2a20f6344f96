//! Layered placement following the transition graph.
//!
//! Steps become nodes of a directed graph and every `(source, target)` pair
//! of every transition becomes an edge. Starting from the root, the `i`-th
//! child of a node on layer `L` is proposed layer `L + 1 + i`; a node keeps
//! the largest layer proposed along any path that reaches it. Within a
//! layer, rows follow the order in which the traversal first reached each
//! node.
//!
//! The traversal keeps an explicit stack instead of recursing and marks the
//! nodes on the current path, so a cycle is reported as
//! [`LayoutError::CyclicGraph`] as soon as an edge leads back onto the path.

use std::{collections::HashMap, iter};

use log::{debug, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use sfcgraph_core::{identifier::Id, model::Sequence};

use super::{GraphNode, Layout, LayoutEngine, LayoutError, expand_edges, step_indices};
use crate::config::RootPolicy;

/// Transition-graph layout, see the [module documentation](self).
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredEngine {
    root_policy: RootPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Visit order of a completed traversal, indexed by node.
struct Traversal {
    post_order: Vec<NodeIndex>,
    discovery: Vec<usize>,
}

impl LayeredEngine {
    pub fn new(root_policy: RootPolicy) -> Self {
        Self { root_policy }
    }

    /// Nodes the traversal starts from, primary root first.
    fn roots(
        &self,
        sequence: &Sequence,
        graph: &DiGraph<Id, usize>,
        indices: &HashMap<Id, usize>,
    ) -> Result<Vec<NodeIndex>, LayoutError> {
        let candidates: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&node| {
                graph
                    .neighbors_directed(node, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();

        if candidates.len() == 1 {
            return Ok(candidates);
        }

        match self.root_policy {
            RootPolicy::Strict => Err(LayoutError::NoUniqueRoot {
                candidates: candidates.iter().map(|&node| graph[node]).collect(),
            }),
            RootPolicy::FirstDeclared => {
                let mut initial = sequence.initial_steps();
                let primary = match (initial.next(), initial.next()) {
                    (Some(step), None) => NodeIndex::new(indices[&step.name]),
                    _ => NodeIndex::new(0),
                };
                debug!(
                    root:% = graph[primary],
                    candidates = candidates.len();
                    "No unique root, falling back to declared step"
                );
                Ok(iter::once(primary)
                    .chain(candidates.into_iter().filter(|&node| node != primary))
                    .collect())
            }
        }
    }
}

impl LayoutEngine for LayeredEngine {
    fn layout(&self, sequence: &Sequence) -> Result<Layout, LayoutError> {
        let (order, indices) = step_indices(sequence);
        if order.is_empty() {
            return Ok(Layout::default());
        }
        let edges = expand_edges(sequence, &indices)?;

        let mut graph: DiGraph<Id, usize> = DiGraph::with_capacity(order.len(), edges.len());
        for &step in &order {
            graph.add_node(step);
        }
        for edge in &edges {
            graph.add_edge(
                NodeIndex::new(indices[&edge.source]),
                NodeIndex::new(indices[&edge.target]),
                edge.transition,
            );
        }

        let children: Vec<Vec<NodeIndex>> = graph
            .node_indices()
            .map(|node| {
                // `neighbors` yields the most recently added edge first.
                let mut children: Vec<_> = graph.neighbors(node).collect();
                children.reverse();
                children
            })
            .collect();

        let roots = self.roots(sequence, &graph, &indices)?;
        // Nodes no root reaches can only hang off a cycle; starting from them
        // too makes the traversal find it.
        let starts = roots.into_iter().chain(graph.node_indices());
        let traversal = traverse(&graph, &children, starts)?;

        // Reverse post-order is a topological order, so every proposal for a
        // node is in before the node proposes to its own children.
        let mut layers = vec![0usize; order.len()];
        for &node in traversal.post_order.iter().rev() {
            let layer = layers[node.index()];
            for (i, child) in children[node.index()].iter().enumerate() {
                let slot = &mut layers[child.index()];
                *slot = (*slot).max(layer + 1 + i);
            }
        }

        let mut discovered: Vec<NodeIndex> = graph.node_indices().collect();
        discovered.sort_by_key(|node| traversal.discovery[node.index()]);
        let mut rows = vec![0usize; order.len()];
        let mut next_row: HashMap<usize, usize> = HashMap::new();
        for node in discovered {
            let row = next_row.entry(layers[node.index()]).or_insert(0);
            rows[node.index()] = *row;
            *row += 1;
        }

        let nodes: Vec<GraphNode> = order
            .iter()
            .enumerate()
            .map(|(idx, &step)| GraphNode {
                step,
                layer: layers[idx],
                row: rows[idx],
            })
            .collect();
        trace!(nodes:? = nodes; "Layered layout");

        Ok(Layout::new(nodes, edges))
    }
}

/// Depth-first traversal from each of `starts` that is not yet visited.
fn traverse(
    graph: &DiGraph<Id, usize>,
    children: &[Vec<NodeIndex>],
    starts: impl IntoIterator<Item = NodeIndex>,
) -> Result<Traversal, LayoutError> {
    let count = graph.node_count();
    let mut marks = vec![Mark::Unvisited; count];
    let mut discovery = vec![usize::MAX; count];
    let mut discovered = 0;
    let mut post_order = Vec::with_capacity(count);
    // (node, index of the next child to visit)
    let mut stack: Vec<(NodeIndex, usize)> = Vec::new();

    for start in starts {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        marks[start.index()] = Mark::OnPath;
        discovery[start.index()] = discovered;
        discovered += 1;
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let Some(&child) = children[node.index()].get(next) else {
                marks[node.index()] = Mark::Done;
                post_order.push(node);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks[child.index()] {
                Mark::Unvisited => {
                    marks[child.index()] = Mark::OnPath;
                    discovery[child.index()] = discovered;
                    discovered += 1;
                    stack.push((child, 0));
                }
                Mark::OnPath => {
                    let entry = stack
                        .iter()
                        .position(|&(on_path, _)| on_path == child)
                        .unwrap_or_default();
                    let cycle = stack[entry..].iter().map(|&(node, _)| graph[node]).collect();
                    return Err(LayoutError::CyclicGraph { cycle });
                }
                Mark::Done => {}
            }
        }
    }

    Ok(Traversal {
        post_order,
        discovery,
    })
}
