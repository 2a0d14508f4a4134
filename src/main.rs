mod image;
mod render;

use anyhow::Context;
use glam::*;

use scene::{loaders, Camera, CameraMode, Intersect, TriangleMesh};

use crate::render::RenderSettings;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "CornellBox-Original.obj".to_string());
    let settings = RenderSettings {
        width: 512,
        height: 512,
        samples: 100,
    };
    let cam_pos = Vec3::new(0.0, 1.0, 3.0);
    let cam_forward = Vec3::new(0.0, 0.0, -1.0);

    let data = loaders::obj::load(&path).with_context(|| format!("loading {}", path))?;
    println!("vertices: {}", data.n_vertices());
    println!("faces: {}", data.n_faces());

    let polygon = data.polygon();
    let mut mesh = TriangleMesh::new(polygon, 0);
    mesh.build_bvh();
    println!("nodes: {}", mesh.n_nodes());
    println!("internal nodes: {}", mesh.n_internal_nodes());
    println!("leaf nodes: {}", mesh.n_leaf_nodes());
    println!("bbox: {}", mesh.root_bounds());

    // Quick sanity probe down the view axis before burning samples.
    let camera = Camera::new(cam_pos, cam_forward, CameraMode::PinholeGather);
    let probe = camera.sample_ray(0.0, 0.0);
    log::debug!("center probe hit: {}", mesh.intersect(&probe).is_some());

    let mut image = render::render(&mesh, &camera, &settings);
    image.gamma_correction();
    image
        .write_ppm("output.ppm")
        .context("writing output.ppm")?;

    Ok(())
}
