use glam::*;

/// Borrowed view over an indexed triangle mesh: packed vertex positions,
/// face indices, and optional per-vertex normals and texture coordinates.
/// The arrays stay owned by the caller and must outlive every triangle and
/// BVH that reads through this view.
///
/// Out-of-range accessor arguments are programming errors; they panic via
/// slice indexing rather than being reported.
#[derive(Debug, Copy, Clone)]
pub struct Polygon<'a> {
    vertices: &'a [f32],
    indices: &'a [u32],
    normals: Option<&'a [f32]>,
    uvs: Option<&'a [f32]>,
}

impl<'a> Polygon<'a> {
    /// `vertices` holds 3 floats per vertex, `indices` 3 entries per face.
    /// `normals` must parallel `vertices`; `uvs` carries 2 floats per
    /// vertex.
    pub fn new(
        vertices: &'a [f32],
        indices: &'a [u32],
        normals: Option<&'a [f32]>,
        uvs: Option<&'a [f32]>,
    ) -> Polygon<'a> {
        debug_assert!(vertices.len() % 3 == 0);
        debug_assert!(indices.len() % 3 == 0);
        if let Some(normals) = normals {
            debug_assert!(normals.len() == vertices.len());
        }
        if let Some(uvs) = uvs {
            debug_assert!(uvs.len() == (vertices.len() / 3) * 2);
        }

        Polygon {
            vertices,
            indices,
            normals,
            uvs,
        }
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn n_faces(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex(&self, vertex_id: u32) -> Vec3 {
        let i = 3 * vertex_id as usize;
        Vec3::new(self.vertices[i], self.vertices[i + 1], self.vertices[i + 2])
    }

    pub fn face_indices(&self, face_id: u32) -> [u32; 3] {
        let f = 3 * face_id as usize;
        [self.indices[f], self.indices[f + 1], self.indices[f + 2]]
    }

    pub fn normal(&self, vertex_id: u32) -> Vec3 {
        let normals = self.normals.expect("mesh has no normals");
        let i = 3 * vertex_id as usize;
        Vec3::new(normals[i], normals[i + 1], normals[i + 2])
    }

    pub fn uv(&self, vertex_id: u32) -> Vec2 {
        let uvs = self.uvs.expect("mesh has no uvs");
        let i = 2 * vertex_id as usize;
        Vec2::new(uvs[i], uvs[i + 1])
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTICES: [f32; 9] = [-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0];
    const INDICES: [u32; 3] = [0, 1, 2];
    const NORMALS: [f32; 9] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    const UVS: [f32; 6] = [0.0, 0.0, 1.0, 0.0, 0.5, 1.0];

    #[test]
    fn counts_come_from_the_right_arrays() {
        let polygon = Polygon::new(&VERTICES, &INDICES, None, None);
        assert_eq!(polygon.n_vertices(), 3);
        assert_eq!(polygon.n_faces(), 1);
        assert!(!polygon.has_normals());
        assert!(!polygon.has_uvs());
    }

    #[test]
    fn accessors_unpack_attributes() {
        let polygon = Polygon::new(&VERTICES, &INDICES, Some(&NORMALS), Some(&UVS));

        assert_eq!(polygon.face_indices(0), [0, 1, 2]);
        let v = polygon.vertex(2);
        assert_eq!((v.x(), v.y(), v.z()), (0.0, 1.0, 0.0));

        let n = polygon.normal(1);
        assert_eq!((n.x(), n.y(), n.z()), (0.0, 0.0, 1.0));

        let uv = polygon.uv(2);
        assert_eq!((uv.x(), uv.y()), (0.5, 1.0));
        assert!(polygon.has_normals());
        assert!(polygon.has_uvs());
    }
}
