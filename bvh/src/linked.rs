use glam::*;
use serde::{Deserialize, Serialize};

use crate::aabb::Bounds;
use crate::{Aabb, BvhStats, Ray};

/// Node of the pointer-style tree, expressed as a tagged record over an
/// arena instead of owning child pointers. Children are pushed before
/// their parent, so the root is the last arena entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LinkedNode {
    Leaf {
        bounds: Aabb,
        first: u32,
        count: u32,
    },
    Internal {
        bounds: Aabb,
        axis: u8,
        left: u32,
        right: u32,
    },
}

impl LinkedNode {
    pub fn bounds(&self) -> Aabb {
        match self {
            LinkedNode::Leaf { bounds, .. } => *bounds,
            LinkedNode::Internal { bounds, .. } => *bounds,
        }
    }
}

/// Reference BVH with the classic layout: an index permutation
/// (`prim_indices`) is reordered during the build, leaves keep a range
/// into it, and primitive tests receive original primitive ids. Slower to
/// walk than the packed array but easier to read; behavior is identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedBvh {
    nodes: Vec<LinkedNode>,
    prim_indices: Vec<u32>,
    stats: BvhStats,
}

impl LinkedBvh {
    pub fn empty() -> LinkedBvh {
        LinkedBvh {
            nodes: Vec::new(),
            prim_indices: Vec::new(),
            stats: BvhStats::default(),
        }
    }

    pub fn build(aabbs: &[Aabb]) -> LinkedBvh {
        Self::build_with_leaf_size(aabbs, 4)
    }

    pub fn build_with_leaf_size(aabbs: &[Aabb], max_leaf_prims: usize) -> LinkedBvh {
        assert!(max_leaf_prims >= 1);

        let centers: Vec<[f32; 3]> = aabbs.iter().map(|bb| bb.center().into()).collect();
        let mut prim_indices: Vec<u32> = (0..aabbs.len() as u32).collect();
        let mut nodes = Vec::with_capacity(2 * aabbs.len());
        let mut stats = BvhStats::default();

        if !aabbs.is_empty() {
            build_node(
                aabbs,
                &centers,
                &mut prim_indices,
                &mut nodes,
                &mut stats,
                0,
                aabbs.len(),
                max_leaf_prims,
            );
        }
        stats.n_nodes = stats.n_internal_nodes + stats.n_leaf_nodes;

        LinkedBvh {
            nodes,
            prim_indices,
            stats,
        }
    }

    pub fn prim_indices(&self) -> &[u32] {
        &self.prim_indices
    }

    pub fn prim_count(&self) -> usize {
        self.prim_indices.len()
    }

    pub fn nodes(&self) -> &[LinkedNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&LinkedNode> {
        self.nodes.last()
    }

    pub fn n_nodes(&self) -> usize {
        self.stats.n_nodes
    }

    pub fn n_internal_nodes(&self) -> usize {
        self.stats.n_internal_nodes
    }

    pub fn n_leaf_nodes(&self) -> usize {
        self.stats.n_leaf_nodes
    }

    /// Closest-hit traversal; `intersection_test` receives original
    /// primitive ids. Recursion depth is the tree depth, which the median
    /// split keeps logarithmic in the primitive count.
    pub fn traverse<I, R>(&self, ray: &Ray, mut intersection_test: I) -> Option<R>
    where
        I: FnMut(usize, f32, f32) -> Option<(f32, R)>,
        R: Copy,
    {
        let mut t = ray.t_max;
        let mut hit_record = None;
        if !self.nodes.is_empty() {
            self.intersect_node(
                self.nodes.len() - 1,
                ray,
                &mut t,
                &mut hit_record,
                &mut intersection_test,
            );
        }
        hit_record
    }

    pub fn traverse_t<I>(&self, ray: &Ray, mut intersection_test: I) -> Option<f32>
    where
        I: FnMut(usize, f32, f32) -> Option<f32>,
    {
        self.traverse(ray, |prim, t_min, t_max| {
            intersection_test(prim, t_min, t_max).map(|t| (t, t))
        })
    }

    pub fn occludes<I>(&self, ray: &Ray, mut intersection_test: I) -> bool
    where
        I: FnMut(usize, f32, f32) -> bool,
    {
        match self.nodes.len() {
            0 => false,
            n => self.occludes_node(n - 1, ray, &mut intersection_test),
        }
    }

    fn intersect_node<I, R>(
        &self,
        node_id: usize,
        ray: &Ray,
        t: &mut f32,
        hit_record: &mut Option<R>,
        intersection_test: &mut I,
    ) where
        I: FnMut(usize, f32, f32) -> Option<(f32, R)>,
        R: Copy,
    {
        match &self.nodes[node_id] {
            LinkedNode::Leaf {
                bounds,
                first,
                count,
            } => {
                if !bounds.intersect(ray, ray.t_min, *t) {
                    return;
                }
                for slot in *first..*first + *count {
                    let prim = self.prim_indices[slot as usize] as usize;
                    if let Some((new_t, record)) = intersection_test(prim, ray.t_min, *t) {
                        *t = new_t;
                        *hit_record = Some(record);
                    }
                }
            }
            LinkedNode::Internal {
                bounds,
                axis,
                left,
                right,
            } => {
                if !bounds.intersect(ray, ray.t_min, *t) {
                    return;
                }
                let (near, far) = if ray.dir_inv_sign[*axis as usize] == 0 {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                self.intersect_node(near as usize, ray, t, hit_record, intersection_test);
                self.intersect_node(far as usize, ray, t, hit_record, intersection_test);
            }
        }
    }

    fn occludes_node<I>(&self, node_id: usize, ray: &Ray, intersection_test: &mut I) -> bool
    where
        I: FnMut(usize, f32, f32) -> bool,
    {
        match &self.nodes[node_id] {
            LinkedNode::Leaf {
                bounds,
                first,
                count,
            } => {
                if !bounds.intersect(ray, ray.t_min, ray.t_max) {
                    return false;
                }
                (*first..*first + *count).any(|slot| {
                    let prim = self.prim_indices[slot as usize] as usize;
                    intersection_test(prim, ray.t_min, ray.t_max)
                })
            }
            LinkedNode::Internal {
                bounds,
                left,
                right,
                ..
            } => {
                bounds.intersect(ray, ray.t_min, ray.t_max)
                    && (self.occludes_node(*left as usize, ray, intersection_test)
                        || self.occludes_node(*right as usize, ray, intersection_test))
            }
        }
    }
}

impl Bounds for LinkedBvh {
    fn bounds(&self) -> Aabb {
        match self.root() {
            Some(root) => root.bounds(),
            None => Aabb::new(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_node(
    aabbs: &[Aabb],
    centers: &[[f32; 3]],
    prim_indices: &mut [u32],
    nodes: &mut Vec<LinkedNode>,
    stats: &mut BvhStats,
    first: usize,
    count: usize,
    max_leaf_prims: usize,
) -> u32 {
    let mut bounds = Aabb::new();
    for &prim in &prim_indices[first..first + count] {
        bounds.grow_bb(&aabbs[prim as usize]);
    }

    if count <= max_leaf_prims {
        nodes.push(LinkedNode::Leaf {
            bounds,
            first: first as u32,
            count: count as u32,
        });
        stats.n_leaf_nodes += 1;
        return nodes.len() as u32 - 1;
    }

    let mut center_bounds = Aabb::new();
    for &prim in &prim_indices[first..first + count] {
        center_bounds.grow(Vec3::from(centers[prim as usize]));
    }
    let axis = center_bounds.longest_axis();

    let split = first + count / 2;
    prim_indices[first..first + count].select_nth_unstable_by(count / 2, |a, b| {
        centers[*a as usize][axis].total_cmp(&centers[*b as usize][axis])
    });

    if split == first || split == first + count {
        log::debug!("median split failed: axis {} range [{}, {})", axis, first, first + count);
        nodes.push(LinkedNode::Leaf {
            bounds,
            first: first as u32,
            count: count as u32,
        });
        stats.n_leaf_nodes += 1;
        return nodes.len() as u32 - 1;
    }

    let left = build_node(
        aabbs,
        centers,
        prim_indices,
        nodes,
        stats,
        first,
        split - first,
        max_leaf_prims,
    );
    let right = build_node(
        aabbs,
        centers,
        prim_indices,
        nodes,
        stats,
        split,
        first + count - split,
        max_leaf_prims,
    );

    nodes.push(LinkedNode::Internal {
        bounds,
        axis: axis as u8,
        left,
        right,
    });
    stats.n_internal_nodes += 1;
    nodes.len() as u32 - 1
}
