use glam::*;

use crate::objects::{IntersectInfo, Polygon};
use bvh::{Aabb, Bounds, Ray};

/// Rejection threshold for near-parallel rays in the determinant test.
const DET_EPS: f32 = 1e-8;

/// One face of a [`Polygon`], referenced by id. A cheap `Copy` value:
/// vertices are fetched through the view on every query.
#[derive(Debug, Copy, Clone)]
pub struct Triangle<'a> {
    polygon: Polygon<'a>,
    face_id: u32,
}

impl<'a> Triangle<'a> {
    pub fn new(polygon: Polygon<'a>, face_id: u32) -> Triangle<'a> {
        Triangle { polygon, face_id }
    }

    pub fn face_id(&self) -> u32 {
        self.face_id
    }

    fn vertices(&self) -> ([u32; 3], Vec3, Vec3, Vec3) {
        let indices = self.polygon.face_indices(self.face_id);
        (
            indices,
            self.polygon.vertex(indices[0]),
            self.polygon.vertex(indices[1]),
            self.polygon.vertex(indices[2]),
        )
    }

    /// Möller-Trumbore closest-hit test against `[t_min, t_max]`.
    ///
    /// The shading normal is the barycentric blend of per-vertex normals
    /// when the mesh carries them (left unnormalized for the caller to
    /// decide), the geometric face normal otherwise. The uv output falls
    /// back to the barycentrics for meshes without texture coordinates.
    pub fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<IntersectInfo> {
        let (indices, v1, v2, v3) = self.vertices();

        let e1 = v2 - v1;
        let e2 = v3 - v1;

        let pvec = ray.direction.cross(e2);
        let det = e1.dot(pvec);
        if det.abs() < DET_EPS {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - v1;
        let u = tvec.dot(pvec) * inv_det;
        if u < 0.0 || u > 1.0 {
            return None;
        }

        let qvec = tvec.cross(e1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(qvec) * inv_det;
        if t < t_min || t > t_max {
            return None;
        }

        let w = 1.0 - u - v;
        let hit_normal = if self.polygon.has_normals() {
            let n1 = self.polygon.normal(indices[0]);
            let n2 = self.polygon.normal(indices[1]);
            let n3 = self.polygon.normal(indices[2]);
            w * n1 + u * n2 + v * n3
        } else {
            e1.cross(e2).normalize()
        };

        let uv = if self.polygon.has_uvs() {
            let uv1 = self.polygon.uv(indices[0]);
            let uv2 = self.polygon.uv(indices[1]);
            let uv3 = self.polygon.uv(indices[2]);
            let uv = uv1 * w + uv2 * u + uv3 * v;
            [uv.x(), uv.y()]
        } else {
            [u, v]
        };

        Some(IntersectInfo {
            t,
            hit_pos: ray.at(t),
            hit_normal,
            barycentric: [u, v],
            uv,
            geom_id: 0,
            prim_id: self.face_id,
        })
    }

    /// Same rejection chain as [`intersect`](Self::intersect) without the
    /// shading computations.
    pub fn intersect_t(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<f32> {
        let (_, v1, v2, v3) = self.vertices();

        let e1 = v2 - v1;
        let e2 = v3 - v1;

        let pvec = ray.direction.cross(e2);
        let det = e1.dot(pvec);
        if det.abs() < DET_EPS {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - v1;
        let u = tvec.dot(pvec) * inv_det;
        if u < 0.0 || u > 1.0 {
            return None;
        }

        let qvec = tvec.cross(e1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(qvec) * inv_det;
        if t < t_min || t > t_max {
            return None;
        }

        Some(t)
    }

    pub fn occludes(&self, ray: &Ray, t_min: f32, t_max: f32) -> bool {
        self.intersect_t(ray, t_min, t_max).is_some()
    }
}

impl Bounds for Triangle<'_> {
    fn bounds(&self) -> Aabb {
        let (_, v1, v2, v3) = self.vertices();
        let mut bounds = Aabb::new();
        bounds.grow(v1);
        bounds.grow(v2);
        bounds.grow(v3);
        bounds
    }
}
