use glam::*;

use super::{BvhBuilder, BvhResult, BvhStats};
use crate::{Aabb, BvhNode};

/// Recursive spatial-median builder.
///
/// Ranges are split at their median element, partially ordered by
/// primitive-box center along the longest axis of the box of centers.
/// Splitting on the center box rather than the merged primitive boxes
/// avoids degenerate splits when primitive boxes overlap heavily.
pub struct MedianSplitBuilder {
    max_leaf_prims: usize,
}

impl MedianSplitBuilder {
    pub fn new(max_leaf_prims: usize) -> Self {
        assert!(max_leaf_prims >= 1);
        // Leaf counts are stored in the packed node's u16.
        assert!(max_leaf_prims <= u16::MAX as usize);
        Self { max_leaf_prims }
    }
}

impl Default for MedianSplitBuilder {
    fn default() -> Self {
        Self::new(4)
    }
}

impl BvhBuilder for MedianSplitBuilder {
    fn build(&self, aabbs: &[Aabb]) -> BvhResult {
        let centers: Vec<[f32; 3]> = aabbs.iter().map(|bb| bb.center().into()).collect();
        let mut prim_order: Vec<u32> = (0..aabbs.len() as u32).collect();
        let mut nodes = Vec::with_capacity(2 * aabbs.len());
        let mut stats = BvhStats::default();

        if !aabbs.is_empty() {
            build_node(
                aabbs,
                &centers,
                &mut prim_order,
                &mut nodes,
                &mut stats,
                0,
                aabbs.len(),
                self.max_leaf_prims,
            );
        }
        stats.n_nodes = stats.n_internal_nodes + stats.n_leaf_nodes;

        BvhResult {
            nodes,
            prim_order,
            stats,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_node(
    aabbs: &[Aabb],
    centers: &[[f32; 3]],
    order: &mut [u32],
    nodes: &mut Vec<BvhNode>,
    stats: &mut BvhStats,
    first: usize,
    count: usize,
    max_leaf_prims: usize,
) {
    let mut bounds = Aabb::new();
    for &prim in &order[first..first + count] {
        bounds.grow_bb(&aabbs[prim as usize]);
    }

    if count <= max_leaf_prims {
        nodes.push(BvhNode::leaf(bounds, first as u32, count as u16));
        stats.n_leaf_nodes += 1;
        return;
    }

    let mut center_bounds = Aabb::new();
    for &prim in &order[first..first + count] {
        center_bounds.grow(Vec3::from(centers[prim as usize]));
    }
    let axis = center_bounds.longest_axis();

    // Equal-count split at the median, quickselect over the centers.
    let split = first + count / 2;
    order[first..first + count].select_nth_unstable_by(count / 2, |a, b| {
        centers[*a as usize][axis].total_cmp(&centers[*b as usize][axis])
    });

    if split == first || split == first + count {
        // One side came up empty; fall through to a larger leaf.
        log::debug!(
            "median split failed: axis {} range [{}, {})",
            axis,
            first,
            first + count
        );
        nodes.push(BvhNode::leaf(bounds, first as u32, count as u16));
        stats.n_leaf_nodes += 1;
        return;
    }

    // Record our position; the second child index is only known once the
    // whole left subtree has been emitted.
    let parent = nodes.len();
    nodes.push(BvhNode::internal(bounds, axis as u8));
    stats.n_internal_nodes += 1;

    build_node(aabbs, centers, order, nodes, stats, first, split - first, max_leaf_prims);
    nodes[parent].offset = nodes.len() as u32;
    build_node(
        aabbs,
        centers,
        order,
        nodes,
        stats,
        split,
        first + count - split,
        max_leaf_prims,
    );
}
