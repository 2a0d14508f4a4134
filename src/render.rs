use glam::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use bvh::Ray;
use scene::{Camera, Intersect, TriangleMesh};

use crate::image::Image;

const PI: f32 = std::f32::consts::PI;
const INV_PI: f32 = 1.0 / PI;

const MAX_DEPTH: usize = 100;
const RUSSIAN_ROULETTE_PROB: f32 = 0.99;
/// Diffuse albedo of every surface; the scene is lit by a white
/// environment.
const RHO: f32 = 0.9;

#[derive(Debug, Copy, Clone)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub samples: usize,
}

fn local_to_world(v: Vec3, lx: Vec3, ly: Vec3, lz: Vec3) -> Vec3 {
    v.x() * lx + v.y() * ly + v.z() * lz
}

fn tangent_space_basis(n: Vec3) -> (Vec3, Vec3) {
    let t = if n.y().abs() < 0.9 {
        n.cross(Vec3::new(0.0, 1.0, 0.0)).normalize()
    } else {
        n.cross(Vec3::new(0.0, 0.0, -1.0)).normalize()
    };
    let b = t.cross(n).normalize();
    (t, b)
}

/// Cosine-weighted hemisphere sample around +y; returns the direction and
/// its pdf.
fn sample_cosine_hemisphere(u: f32, v: f32) -> (Vec3, f32) {
    let theta = 0.5 * ((1.0 - 2.0 * u).clamp(-1.0, 1.0)).acos();
    let phi = 2.0 * PI * v;

    let cos_theta = theta.cos();
    let pdf = cos_theta * INV_PI;
    let direction = Vec3::new(
        phi.cos() * theta.sin(),
        cos_theta,
        phi.sin() * theta.sin(),
    );
    (direction, pdf)
}

/// Unidirectional path tracing with a Lambertian brdf everywhere. Paths
/// that escape the scene collect the white environment.
pub fn path_trace(ray_in: Ray, scene: &TriangleMesh, rng: &mut SmallRng) -> Vec3 {
    let rho = Vec3::splat(RHO);
    let mut radiance = Vec3::zero();
    let mut throughput = Vec3::one();
    let mut ray = ray_in;

    for _ in 0..MAX_DEPTH {
        if rng.gen::<f32>() > RUSSIAN_ROULETTE_PROB {
            break;
        }
        throughput = throughput / RUSSIAN_ROULETTE_PROB;

        let info = match scene.intersect(&ray) {
            Some(info) => info,
            None => {
                radiance += throughput * Vec3::one();
                break;
            }
        };

        // Face the normal against the incoming ray.
        let mut normal = info.hit_normal;
        if (-ray.direction).dot(normal) < 0.0 {
            normal = -normal;
        }

        let (tangent, binormal) = tangent_space_basis(normal);
        let (direction_tangent, pdf) = sample_cosine_hemisphere(rng.gen(), rng.gen());
        let direction = local_to_world(direction_tangent, tangent, normal, binormal);

        let brdf = rho * INV_PI;
        let cos = direction.dot(normal).max(0.0);
        throughput *= brdf * (cos / pdf);

        ray = Ray::new(info.hit_pos, direction);
    }

    radiance
}

/// Renders row-parallel; every pixel owns a deterministic rng stream, so
/// the output is reproducible regardless of scheduling.
pub fn render(mesh: &TriangleMesh, camera: &Camera, settings: &RenderSettings) -> Image {
    let RenderSettings {
        width,
        height,
        samples,
    } = *settings;
    let mut image = Image::new(width, height);

    image
        .pixels_mut()
        .par_chunks_mut(3 * width)
        .enumerate()
        .for_each(|(j, row)| {
            for i in 0..width {
                let mut rng = SmallRng::seed_from_u64((i + width * j) as u64);

                let mut color = Vec3::zero();
                for _ in 0..samples {
                    let u = (2.0 * (i as f32 + rng.gen::<f32>()) - width as f32) / height as f32;
                    let v = (2.0 * (j as f32 + rng.gen::<f32>()) - height as f32) / height as f32;
                    let ray = camera.sample_ray(u, v);
                    color += path_trace(ray, mesh, &mut rng);
                }
                color = color / samples as f32;

                row[3 * i] = color.x();
                row[3 * i + 1] = color.y();
                row[3 * i + 2] = color.z();
            }
        });

    image
}
