//! Source-order placement in fixed-height columns.

use log::trace;

use sfcgraph_core::model::Sequence;

use super::{GraphNode, Layout, LayoutEngine, LayoutError, expand_edges, step_indices};

/// Stacks steps top-down in declaration order and starts a new column
/// whenever the next shape would sit below `column_height`.
///
/// Transitions do not influence placement, so any step graph is accepted.
#[derive(Debug, Clone, Copy)]
pub struct ColumnEngine {
    origin_y: u32,
    spacing_y: u32,
    column_height: u32,
}

impl ColumnEngine {
    pub fn new(origin_y: u32, spacing_y: u32, column_height: u32) -> Self {
        Self {
            origin_y,
            spacing_y,
            column_height,
        }
    }

    /// Number of shapes that fit in one column; at least one.
    fn rows_per_column(&self) -> usize {
        if self.origin_y > self.column_height {
            return 1;
        }
        match self.spacing_y {
            0 => usize::MAX,
            spacing => ((self.column_height - self.origin_y) / spacing) as usize + 1,
        }
    }
}

impl LayoutEngine for ColumnEngine {
    fn layout(&self, sequence: &Sequence) -> Result<Layout, LayoutError> {
        let (order, indices) = step_indices(sequence);
        if order.is_empty() {
            return Ok(Layout::default());
        }
        let edges = expand_edges(sequence, &indices)?;

        let rows = self.rows_per_column();
        let nodes: Vec<GraphNode> = order
            .iter()
            .enumerate()
            .map(|(idx, &step)| GraphNode {
                step,
                layer: idx / rows,
                row: idx % rows,
            })
            .collect();
        trace!(nodes:? = nodes, rows_per_column = rows; "Column layout");

        Ok(Layout::new(nodes, edges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::sequence;

    fn placements(layout: &Layout) -> Vec<(usize, usize)> {
        layout.nodes().iter().map(|n| (n.layer, n.row)).collect()
    }

    #[test]
    fn test_default_geometry_fits_three_rows() {
        // y = 100, 250, 400 fit; 550 would exceed 500.
        let engine = ColumnEngine::new(100, 150, 500);
        let seq = sequence(&["S1", "S2", "S3", "S4", "S5"], &[]);

        assert_eq!(
            placements(&engine.layout(&seq).unwrap()),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]
        );
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let engine = ColumnEngine::new(100, 200, 500);
        assert_eq!(engine.rows_per_column(), 3);
    }

    #[test]
    fn test_origin_below_column_height() {
        let engine = ColumnEngine::new(600, 150, 500);
        let seq = sequence(&["S1", "S2"], &[]);

        assert_eq!(placements(&engine.layout(&seq).unwrap()), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_cycles_are_accepted() {
        let engine = ColumnEngine::new(100, 150, 500);
        let seq = sequence(&["S1", "S2"], &[("S1", "S2"), ("S2", "S1")]);
        let layout = engine.layout(&seq).unwrap();

        assert_eq!(layout.edges().len(), 2);
    }
}
