use glam::*;

pub const DEFAULT_T_MIN: f32 = 1e-3;

/// A ray with its inverse direction and per-axis sign bits precomputed for
/// the slab test. `dir_inv` components may be infinite when the direction
/// has a zero component; IEEE arithmetic keeps the slab test well defined.
///
/// The `[t_min, t_max]` interval is the query window. Traversal never
/// mutates it; the working upper bound is threaded through the traversal
/// instead.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub dir_inv: [f32; 3],
    pub dir_inv_sign: [usize; 3],
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Ray::with_interval(origin, direction, DEFAULT_T_MIN, f32::INFINITY)
    }

    pub fn with_interval(origin: Vec3, direction: Vec3, t_min: f32, t_max: f32) -> Ray {
        let dir_inv: [f32; 3] = (Vec3::new(1.0, 1.0, 1.0) / direction).into();
        let mut dir_inv_sign = [0; 3];
        for i in 0..3 {
            dir_inv_sign[i] = if dir_inv[i] > 0.0 { 0 } else { 1 };
        }

        Ray {
            origin,
            direction,
            dir_inv,
            dir_inv_sign,
            t_min,
            t_max,
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}
