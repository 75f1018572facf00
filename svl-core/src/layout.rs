//! Conversion of the concatenation tree into absolute grid coordinates.
//!
//! Each leaf starts life in a unit cell. Concatenations stretch their
//! children to a common breadth (the least common multiple of the child
//! breadths) and then shift them into place along the concatenation axis,
//! so nested proportions survive into the flat grid.

use crate::ast::{LayoutNode, PositionedPlot};

/// Greatest common divisor via Euclid's algorithm.
fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Least common multiple.
fn lcm(a: usize, b: usize) -> usize {
    a * b / gcd(a, b)
}

/// Stretch a node's intervals and then shift them into place.
pub fn shift_node_position(
    node: &mut PositionedPlot,
    row_shift: usize,
    column_shift: usize,
    row_stretch: usize,
    column_stretch: usize,
) {
    node.row_start = row_stretch * node.row_start + row_shift;
    node.row_end = row_stretch * node.row_end + row_shift;
    node.column_start = column_stretch * node.column_start + column_shift;
    node.column_end = column_stretch * node.column_end + column_shift;
}

/// Flatten a layout tree into positioned plots on a shared grid.
///
/// Sibling order in the source fixes visual order: horizontal
/// concatenations lay out left to right, vertical ones top to bottom.
pub fn tree_to_grid(tree: &LayoutNode) -> Vec<PositionedPlot> {
    match tree {
        LayoutNode::Leaf(plot) => vec![PositionedPlot {
            plot: (**plot).clone(),
            row_start: 0,
            row_end: 1,
            column_start: 0,
            column_end: 1,
        }],
        LayoutNode::HCat(children) => concatenate(children, true),
        LayoutNode::VCat(children) => concatenate(children, false),
    }
}

fn concatenate(children: &[LayoutNode], horizontal: bool) -> Vec<PositionedPlot> {
    let subtrees: Vec<Vec<PositionedPlot>> = children.iter().map(tree_to_grid).collect();

    // The breadth of a subtree is how far its nodes extend in each
    // dimension; stretching every subtree to the LCM of the breadths keeps
    // the relative proportions intact.
    let row_breadths: Vec<usize> = subtrees
        .iter()
        .map(|nodes| nodes.iter().map(|n| n.row_end).max().unwrap_or(1))
        .collect();
    let column_breadths: Vec<usize> = subtrees
        .iter()
        .map(|nodes| nodes.iter().map(|n| n.column_end).max().unwrap_or(1))
        .collect();

    let row_unit = row_breadths.iter().copied().fold(1, lcm);
    let column_unit = column_breadths.iter().copied().fold(1, lcm);

    // vcat shifts rows, hcat shifts columns.
    let row_shift = if horizontal { 0 } else { row_unit };
    let column_shift = if horizontal { column_unit } else { 0 };

    let mut positioned = Vec::new();
    for (index, mut nodes) in subtrees.into_iter().enumerate() {
        let row_stretch = row_unit / row_breadths[index];
        let column_stretch = column_unit / column_breadths[index];
        for node in &mut nodes {
            shift_node_position(
                node,
                row_shift * index,
                column_shift * index,
                row_stretch,
                column_stretch,
            );
        }
        positioned.append(&mut nodes);
    }

    positioned
}

/// The grid extent implied by a set of positioned plots:
/// `(num_rows, num_columns)`.
pub fn grid_extent(plots: &[PositionedPlot]) -> (usize, usize) {
    (
        plots.iter().map(|p| p.row_end).max().unwrap_or(0),
        plots.iter().map(|p| p.column_end).max().unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ChartType, Plot};

    fn leaf(name: &str) -> LayoutNode {
        LayoutNode::Leaf(Box::new(Plot::new(ChartType::Scatter, name)))
    }

    fn intervals(plots: &[PositionedPlot]) -> Vec<(usize, usize, usize, usize)> {
        plots
            .iter()
            .map(|p| (p.row_start, p.row_end, p.column_start, p.column_end))
            .collect()
    }

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(lcm(4, 6), 12);
        assert_eq!(lcm(1, 5), 5);
    }

    #[test]
    fn test_shift_node_position() {
        let mut node = PositionedPlot {
            plot: Plot::new(ChartType::Line, "bigfoot"),
            row_start: 0,
            row_end: 1,
            column_start: 2,
            column_end: 3,
        };
        shift_node_position(&mut node, 3, 2, 3, 2);
        assert_eq!(
            (node.row_start, node.row_end, node.column_start, node.column_end),
            (3, 6, 6, 8)
        );
    }

    #[test]
    fn test_single_leaf_is_unit_cell() {
        let grid = tree_to_grid(&leaf("p1"));
        assert_eq!(intervals(&grid), vec![(0, 1, 0, 1)]);
    }

    #[test]
    fn test_single_child_cat_degenerates() {
        let grid = tree_to_grid(&LayoutNode::HCat(vec![leaf("p1")]));
        assert_eq!(intervals(&grid), vec![(0, 1, 0, 1)]);
    }

    #[test]
    fn test_vcat_stacks_rows() {
        let grid = tree_to_grid(&LayoutNode::VCat(vec![leaf("p1"), leaf("p2")]));
        assert_eq!(intervals(&grid), vec![(0, 1, 0, 1), (1, 2, 0, 1)]);
    }

    #[test]
    fn test_hcat_lays_out_columns() {
        let grid = tree_to_grid(&LayoutNode::HCat(vec![leaf("p1"), leaf("p2")]));
        assert_eq!(intervals(&grid), vec![(0, 1, 0, 1), (0, 1, 1, 2)]);
    }

    #[test]
    fn test_nested_proportions() {
        // VCat[HCat[P1, P2], VCat[P3, P4]]
        let tree = LayoutNode::VCat(vec![
            LayoutNode::HCat(vec![leaf("p1"), leaf("p2")]),
            LayoutNode::VCat(vec![leaf("p3"), leaf("p4")]),
        ]);
        let grid = tree_to_grid(&tree);
        assert_eq!(
            intervals(&grid),
            vec![(0, 2, 0, 1), (0, 2, 1, 2), (2, 3, 0, 2), (3, 4, 0, 2)]
        );
        assert_eq!(grid_extent(&grid), (4, 2));
    }

    #[test]
    fn test_uneven_sibling_counts() {
        // Three side-by-side stacks of different depths.
        let tree = LayoutNode::HCat(vec![
            LayoutNode::VCat(vec![leaf("p1"), leaf("p2"), leaf("p3")]),
            LayoutNode::VCat(vec![leaf("p4"), leaf("p5")]),
            leaf("p6"),
        ]);
        let grid = tree_to_grid(&tree);
        let (rows, columns) = grid_extent(&grid);
        assert_eq!((rows, columns), (6, 3));

        // Every leaf keeps a non-empty cell and the areas tile the grid.
        let area: usize = grid
            .iter()
            .map(|p| (p.row_end - p.row_start) * (p.column_end - p.column_start))
            .sum();
        assert_eq!(area, rows * columns);
    }

    #[test]
    fn test_no_two_leaves_overlap() {
        let tree = LayoutNode::VCat(vec![
            LayoutNode::HCat(vec![leaf("p1"), LayoutNode::VCat(vec![leaf("p2"), leaf("p3")])]),
            leaf("p4"),
        ]);
        let grid = tree_to_grid(&tree);
        for (i, a) in grid.iter().enumerate() {
            for b in grid.iter().skip(i + 1) {
                let rows_disjoint = a.row_end <= b.row_start || b.row_end <= a.row_start;
                let columns_disjoint =
                    a.column_end <= b.column_start || b.column_end <= a.column_start;
                assert!(
                    rows_disjoint || columns_disjoint,
                    "overlapping leaves: {:?} vs {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_source_order_preserved() {
        let grid = tree_to_grid(&LayoutNode::HCat(vec![leaf("p1"), leaf("p2"), leaf("p3")]));
        for pair in grid.windows(2) {
            assert!(pair[0].column_start <= pair[1].column_start);
        }
    }
}
