pub mod median_builder;

pub use median_builder::*;

use serde::{Deserialize, Serialize};

use crate::{Aabb, BvhNode};

/// Node and primitive counts gathered while a tree is emitted.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct BvhStats {
    pub n_nodes: usize,
    pub n_internal_nodes: usize,
    pub n_leaf_nodes: usize,
}

/// Output of a builder: the depth-first node array plus the primitive
/// permutation it decided on. Slot `i` of the tree refers to input
/// primitive `prim_order[i]`; owners of primitive storage apply the
/// permutation once so leaf ranges index their storage directly.
pub struct BvhResult {
    pub nodes: Vec<BvhNode>,
    pub prim_order: Vec<u32>,
    pub stats: BvhStats,
}

pub trait BvhBuilder {
    fn build(&self, aabbs: &[Aabb]) -> BvhResult;
}
