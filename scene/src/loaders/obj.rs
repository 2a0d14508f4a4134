use std::path::Path;

use super::{LoadError, MeshData};

/// Loads a Wavefront OBJ into flat arrays, triangulating faces and
/// reindexing attributes so normals and uvs parallel the vertex array.
/// All models in the file are merged into one mesh.
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshData, LoadError> {
    let (models, _materials) = tobj::load_obj(
        path.as_ref(),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let data = merge_models(&models);
    log::info!(
        "loaded {}: {} vertices, {} faces, normals: {}, uvs: {}",
        path.as_ref().display(),
        data.n_vertices(),
        data.n_faces(),
        data.normals.is_some(),
        data.uvs.is_some()
    );
    Ok(data)
}

/// Concatenates model arrays with vertex-offset-adjusted indices. Normals
/// and uvs are kept only when every model carries a complete set; a mesh
/// with partial attributes degrades to face normals / barycentric uvs.
fn merge_models(models: &[tobj::Model]) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut all_normals = true;
    let mut all_uvs = true;

    for model in models {
        let mesh = &model.mesh;
        let base = (vertices.len() / 3) as u32;

        indices.extend(mesh.indices.iter().map(|&i| i + base));
        vertices.extend_from_slice(&mesh.positions);

        if mesh.normals.len() == mesh.positions.len() {
            normals.extend_from_slice(&mesh.normals);
        } else {
            all_normals = false;
        }
        if mesh.texcoords.len() == (mesh.positions.len() / 3) * 2 {
            uvs.extend_from_slice(&mesh.texcoords);
        } else {
            all_uvs = false;
        }
    }

    if !all_normals && !normals.is_empty() {
        log::warn!("dropping partial normal set");
    }
    if !all_uvs && !uvs.is_empty() {
        log::warn!("dropping partial uv set");
    }

    MeshData {
        vertices,
        indices,
        normals: if all_normals && !normals.is_empty() {
            Some(normals)
        } else {
            None
        },
        uvs: if all_uvs && !uvs.is_empty() {
            Some(uvs)
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_QUADS: &str = "
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1 4//1
o second
v 0.0 0.0 1.0
v 1.0 0.0 1.0
v 1.0 1.0 1.0
f 5//1 6//1 7//1
";

    fn parse(source: &str) -> MeshData {
        let mut reader = std::io::Cursor::new(source);
        let (models, _) = tobj::load_obj_buf(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |_| Ok((Vec::new(), ahash::AHashMap::new())),
        )
        .unwrap();
        merge_models(&models)
    }

    #[test]
    fn triangulates_and_merges_models() {
        let data = parse(TWO_QUADS);

        // Quad becomes two faces, second model appends one more.
        assert_eq!(data.n_faces(), 3);
        assert_eq!(data.indices.len(), 9);
        assert!(data.normals.is_some());

        // Indices of the second model must point past the first model's
        // vertices.
        let polygon = data.polygon();
        let last = polygon.face_indices(2);
        let v = polygon.vertex(last[0]);
        assert_eq!(v.z(), 1.0);
    }

    #[test]
    fn no_texcoords_means_no_uvs() {
        let data = parse(TWO_QUADS);
        assert!(data.uvs.is_none());
    }

    #[test]
    fn plain_triangle_without_normals() {
        let source = "
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let data = parse(source);
        assert_eq!(data.n_faces(), 1);
        assert!(data.normals.is_none());
        assert!(data.uvs.is_none());
    }
}
