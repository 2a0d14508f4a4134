pub mod mesh;
pub mod polygon;
pub mod triangle;

pub use mesh::*;
pub use polygon::*;
pub use triangle::*;

use bvh::Ray;
use glam::*;

/// Everything known about a successful surface hit. Produced only when an
/// intersection test accepts; there is no "empty" value.
#[derive(Debug, Copy, Clone)]
pub struct IntersectInfo {
    pub t: f32,
    pub hit_pos: Vec3,
    pub hit_normal: Vec3,
    /// Möller-Trumbore `(u, v)`; the first weight is `1 - u - v`.
    pub barycentric: [f32; 2],
    /// Interpolated texture coordinates, or the barycentrics when the mesh
    /// has none.
    pub uv: [f32; 2],
    pub geom_id: u32,
    pub prim_id: u32,
}

pub trait Intersect {
    /// Closest hit in the ray's `[t_min, t_max]` interval.
    fn intersect(&self, ray: &Ray) -> Option<IntersectInfo>;

    /// Closest hit distance only.
    fn intersect_t(&self, ray: &Ray) -> Option<f32>;

    /// Whether anything at all lies in the interval.
    fn occludes(&self, ray: &Ray) -> bool;
}
