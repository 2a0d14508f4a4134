pub mod obj;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::objects::Polygon;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse OBJ: {0}")]
    Parse(#[from] tobj::LoadError),
    #[error("snapshot codec error: {0}")]
    Snapshot(#[from] bincode::Error),
}

/// Owned mesh arrays as produced by a loader. Normals parallel the vertex
/// array; uvs carry two floats per vertex. A [`Polygon`] view can be taken
/// any time; the data must simply outlive it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub normals: Option<Vec<f32>>,
    pub uvs: Option<Vec<f32>>,
}

impl MeshData {
    pub fn n_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn n_faces(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn polygon(&self) -> Polygon<'_> {
        Polygon::new(
            &self.vertices,
            &self.indices,
            self.normals.as_deref(),
            self.uvs.as_deref(),
        )
    }

    /// Writes a bincode snapshot, a cheap reload path for large meshes
    /// whose OBJ parse dominates startup.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), LoadError> {
        let encoded: Vec<u8> = bincode::serialize(self)?;
        let mut file = File::create(path.as_ref()).map_err(|source| LoadError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        file.write_all(encoded.as_ref())
            .map_err(|source| LoadError::Io {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        Ok(())
    }

    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<MeshData, LoadError> {
        let file = File::open(path.as_ref()).map_err(|source| LoadError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        Ok(bincode::deserialize_from(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_roundtrip() {
        let data = MeshData {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
            normals: None,
            uvs: Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
        };

        let path = std::env::temp_dir().join("meshdata_snapshot_roundtrip.bin");
        data.save_snapshot(&path).unwrap();
        let restored = MeshData::load_snapshot(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored.vertices, data.vertices);
        assert_eq!(restored.indices, data.indices);
        assert_eq!(restored.normals, None);
        assert_eq!(restored.uvs, data.uvs);

        let polygon = restored.polygon();
        assert_eq!(polygon.n_faces(), 1);
        assert!(polygon.has_uvs());
    }

    #[test]
    fn missing_snapshot_reports_the_path() {
        let error = MeshData::load_snapshot("/nonexistent/mesh.bin").unwrap_err();
        assert!(matches!(error, LoadError::Io { .. }));
        assert!(error.to_string().contains("/nonexistent/mesh.bin"));
    }
}
