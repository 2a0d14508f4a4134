use serde::{Deserialize, Serialize};

use crate::aabb::Bounds;
use crate::bvh_node::BvhNode;
use crate::{Aabb, BvhBuilder, BvhStats, MedianSplitBuilder, Ray};

/// Packed-array BVH: nodes in depth-first order, primitives addressed by
/// the permuted slot index. Built once, then immutable; traversal is
/// `&self` and safe to share across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    prim_order: Vec<u32>,
    stats: BvhStats,
}

impl Bvh {
    pub fn empty() -> Bvh {
        Bvh {
            nodes: Vec::new(),
            prim_order: Vec::new(),
            stats: BvhStats::default(),
        }
    }

    pub fn build(aabbs: &[Aabb]) -> Bvh {
        Self::build_with(&MedianSplitBuilder::default(), aabbs)
    }

    pub fn build_with<B: BvhBuilder>(builder: &B, aabbs: &[Aabb]) -> Bvh {
        let instant = std::time::Instant::now();
        let result = builder.build(aabbs);
        log::debug!(
            "built bvh over {} primitives ({} nodes) in {} ms",
            aabbs.len(),
            result.stats.n_nodes,
            instant.elapsed().as_millis()
        );

        Bvh {
            nodes: result.nodes,
            prim_order: result.prim_order,
            stats: result.stats,
        }
    }

    /// The slot permutation decided at build time. Owners of primitive
    /// storage reorder it by this once, so leaf ranges address the storage
    /// directly.
    pub fn prim_order(&self) -> &[u32] {
        &self.prim_order
    }

    pub fn prim_count(&self) -> usize {
        self.prim_order.len()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
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

    #[inline(always)]
    pub fn traverse<I, R>(&self, ray: &Ray, intersection_test: I) -> Option<R>
    where
        I: FnMut(usize, f32, f32) -> Option<(f32, R)>,
        R: Copy,
    {
        BvhNode::traverse(self.nodes.as_slice(), ray, intersection_test)
    }

    #[inline(always)]
    pub fn traverse_t<I>(&self, ray: &Ray, intersection_test: I) -> Option<f32>
    where
        I: FnMut(usize, f32, f32) -> Option<f32>,
    {
        BvhNode::traverse_t(self.nodes.as_slice(), ray, intersection_test)
    }

    #[inline(always)]
    pub fn occludes<I>(&self, ray: &Ray, intersection_test: I) -> bool
    where
        I: FnMut(usize, f32, f32) -> bool,
    {
        BvhNode::occludes(self.nodes.as_slice(), ray, intersection_test)
    }

    #[inline(always)]
    pub fn depth_test<I>(&self, ray: &Ray, intersection_test: I) -> (f32, u32)
    where
        I: FnMut(usize, f32, f32) -> Option<f32>,
    {
        BvhNode::depth_test(self.nodes.as_slice(), ray, intersection_test)
    }
}

impl Bounds for Bvh {
    fn bounds(&self) -> Aabb {
        match self.nodes.first() {
            Some(root) => root.bounds,
            None => Aabb::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::*;

    // Unit boxes strung along x; a slab-test closure stands in for real
    // primitives so the container can be exercised without any geometry.
    fn boxes_on_a_line(n: usize) -> Vec<Aabb> {
        (0..n)
            .map(|i| {
                let base = Vec3::new(i as f32 * 2.0, 0.0, 0.0);
                (base, base + Vec3::one()).into()
            })
            .collect()
    }

    fn box_entry_test<'a>(
        bvh: &'a Bvh,
        aabbs: &'a [Aabb],
        ray: &'a Ray,
    ) -> impl FnMut(usize, f32, f32) -> Option<(f32, usize)> + 'a {
        move |slot, t_min, t_max| {
            let prim = bvh.prim_order()[slot] as usize;
            let entry = (aabbs[prim].min[0] - ray.origin.x()) * ray.dir_inv[0];
            if entry >= t_min && entry <= t_max {
                Some((entry, prim))
            } else {
                None
            }
        }
    }

    #[test]
    fn traverse_finds_the_nearest_box() {
        let aabbs = boxes_on_a_line(50);
        let bvh = Bvh::build(&aabbs);

        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let hit = bvh.traverse(&ray, box_entry_test(&bvh, &aabbs, &ray));
        assert_eq!(hit, Some(0));

        // Entering mid-array must skip everything behind the origin.
        let ray = Ray::new(Vec3::new(20.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let hit = bvh.traverse(&ray, box_entry_test(&bvh, &aabbs, &ray));
        assert_eq!(hit, Some(11));

        // Same scene walked backwards.
        let ray = Ray::new(Vec3::new(20.5, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        let hit = bvh.traverse(&ray, |slot, t_min, t_max| {
            let prim = bvh.prim_order()[slot] as usize;
            let entry = (aabbs[prim].max[0] - ray.origin.x()) * ray.dir_inv[0];
            (entry >= t_min && entry <= t_max).then(|| (entry, prim))
        });
        assert_eq!(hit, Some(9));
    }

    #[test]
    fn traverse_misses_cleanly() {
        let aabbs = boxes_on_a_line(10);
        let bvh = Bvh::build(&aabbs);

        let ray = Ray::new(Vec3::new(-1.0, 5.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let hit = bvh.traverse(&ray, box_entry_test(&bvh, &aabbs, &ray));
        assert_eq!(hit, None);
        assert!(!bvh.occludes(&ray, |_, _, _| true));
    }

    #[test]
    fn traverse_t_matches_traverse() {
        let aabbs = boxes_on_a_line(50);
        let bvh = Bvh::build(&aabbs);
        let ray = Ray::new(Vec3::new(8.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));

        let record_t = bvh
            .traverse(&ray, box_entry_test(&bvh, &aabbs, &ray))
            .map(|prim| (aabbs[prim].min[0] - ray.origin.x()) * ray.dir_inv[0]);
        let t = bvh.traverse_t(&ray, |slot, t_min, t_max| {
            let prim = bvh.prim_order()[slot] as usize;
            let entry = (aabbs[prim].min[0] - ray.origin.x()) * ray.dir_inv[0];
            (entry >= t_min && entry <= t_max).then(|| entry)
        });
        assert_eq!(record_t, t);
    }

    #[test]
    fn occlusion_stops_early() {
        let aabbs = boxes_on_a_line(50);
        let bvh = Bvh::build(&aabbs);
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));

        let mut tested = 0;
        assert!(bvh.occludes(&ray, |_, _, _| {
            tested += 1;
            true
        }));
        assert_eq!(tested, 1);
    }

    #[test]
    fn depth_test_visits_fewer_nodes_with_close_hits() {
        let aabbs = boxes_on_a_line(200);
        let bvh = Bvh::build(&aabbs);
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));

        let (_, visited_with_hits) = bvh.depth_test(&ray, |slot, t_min, t_max| {
            let prim = bvh.prim_order()[slot] as usize;
            let entry = (aabbs[prim].min[0] - ray.origin.x()) * ray.dir_inv[0];
            (entry >= t_min && entry <= t_max).then(|| entry)
        });
        let (_, visited_without) = bvh.depth_test(&ray, |_, _, _| None);

        assert!(visited_with_hits > 0);
        assert!(visited_with_hits < visited_without);
    }

    #[test]
    fn empty_tree_has_empty_bounds() {
        let bvh = Bvh::empty();
        assert!(bvh.bounds().is_empty());
        assert_eq!(bvh.n_nodes(), 0);

        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(bvh.traverse::<_, u32>(&ray, |_, _, _| None), None);
    }

    #[test]
    fn root_bounds_cover_the_scene() {
        let aabbs = boxes_on_a_line(33);
        let bvh = Bvh::build(&aabbs);

        let mut all = Aabb::new();
        for bb in &aabbs {
            all.grow_bb(bb);
        }
        assert_eq!(bvh.bounds().min, all.min);
        assert_eq!(bvh.bounds().max, all.max);
        assert_eq!(bvh.prim_count(), aabbs.len());
    }
}
