use bvh::{Aabb, Bounds, Bvh, LinkedBvh, Ray};

use crate::objects::{Intersect, IntersectInfo, Polygon, Triangle};

/// A [`Polygon`] with one [`Triangle`] per face and a packed BVH over
/// them. Build once with [`build_bvh`](Self::build_bvh); afterwards the
/// mesh is immutable and queries are `&self`, so it can be shared freely
/// across render threads. Each query owns its [`Ray`] and receives its own
/// hit record.
#[derive(Debug, Clone)]
pub struct TriangleMesh<'a> {
    polygon: Polygon<'a>,
    triangles: Vec<Triangle<'a>>,
    bvh: Bvh,
    geom_id: u32,
}

impl<'a> TriangleMesh<'a> {
    /// Materializes one triangle per face, in face order. The BVH is not
    /// built yet; queries on an unbuilt mesh see an empty tree and miss.
    pub fn new(polygon: Polygon<'a>, geom_id: u32) -> TriangleMesh<'a> {
        let triangles = (0..polygon.n_faces())
            .map(|f| Triangle::new(polygon, f as u32))
            .collect();

        TriangleMesh {
            polygon,
            triangles,
            bvh: Bvh::empty(),
            geom_id,
        }
    }

    /// Builds the packed BVH and reorders the triangle storage with the
    /// builder's permutation, so leaf ranges address it directly.
    pub fn build_bvh(&mut self) {
        let aabbs: Vec<Aabb> = self.triangles.iter().map(|t| t.bounds()).collect();
        self.bvh = Bvh::build(&aabbs);

        let order = self.bvh.prim_order();
        self.triangles = order
            .iter()
            .map(|&prim| self.triangles[prim as usize])
            .collect();
    }

    /// The pointer-style reference tree over the same faces. Kept for
    /// comparison; face ids reported by both variants refer to the same
    /// input faces.
    pub fn linked_bvh(&self) -> LinkedBvh {
        let aabbs: Vec<Aabb> = (0..self.polygon.n_faces())
            .map(|f| Triangle::new(self.polygon, f as u32).bounds())
            .collect();
        LinkedBvh::build(&aabbs)
    }

    pub fn polygon(&self) -> &Polygon<'a> {
        &self.polygon
    }

    pub fn n_faces(&self) -> usize {
        self.triangles.len()
    }

    pub fn geom_id(&self) -> u32 {
        self.geom_id
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn n_nodes(&self) -> usize {
        self.bvh.n_nodes()
    }

    pub fn n_internal_nodes(&self) -> usize {
        self.bvh.n_internal_nodes()
    }

    pub fn n_leaf_nodes(&self) -> usize {
        self.bvh.n_leaf_nodes()
    }

    pub fn root_bounds(&self) -> Aabb {
        self.bvh.bounds()
    }
}

impl Intersect for TriangleMesh<'_> {
    fn intersect(&self, ray: &Ray) -> Option<IntersectInfo> {
        self.bvh.traverse(ray, |slot, t_min, t_max| {
            let triangle = &self.triangles[slot];
            triangle.intersect(ray, t_min, t_max).map(|mut info| {
                info.geom_id = self.geom_id;
                (info.t, info)
            })
        })
    }

    fn intersect_t(&self, ray: &Ray) -> Option<f32> {
        self.bvh.traverse_t(ray, |slot, t_min, t_max| {
            self.triangles[slot].intersect_t(ray, t_min, t_max)
        })
    }

    fn occludes(&self, ray: &Ray) -> bool {
        self.bvh.occludes(ray, |slot, t_min, t_max| {
            self.triangles[slot].occludes(ray, t_min, t_max)
        })
    }
}

impl Bounds for TriangleMesh<'_> {
    fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }
}
