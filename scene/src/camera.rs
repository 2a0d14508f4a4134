use glam::*;

use bvh::Ray;

/// How a sensor sample is turned into a ray direction. Both conventions
/// appear in the wild and frame the scene slightly differently, so the
/// choice is explicit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CameraMode {
    /// Direction from the sensor point toward the pinhole one unit ahead
    /// of the camera: `normalize(pinhole - sensor)`. Mirrors the physical
    /// pinhole, so the image of the sample plane is flipped.
    PinholeGather,
    /// Direction offset straight into the scene:
    /// `normalize(forward + u * right + v * up)`.
    ForwardOffset,
}

/// Pinhole camera with an orthonormal basis derived from a forward vector
/// and the world up axis. `forward` must not be vertical.
#[derive(Debug, Copy, Clone)]
pub struct Camera {
    pos: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    mode: CameraMode,
}

impl Camera {
    pub fn new(pos: Vec3, forward: Vec3, mode: CameraMode) -> Camera {
        let right = forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalize();
        let up = right.cross(forward).normalize();

        log::debug!(
            "camera at ({}, {}, {}), forward ({}, {}, {})",
            pos.x(),
            pos.y(),
            pos.z(),
            forward.x(),
            forward.y(),
            forward.z()
        );

        Camera {
            pos,
            forward,
            right,
            up,
            mode,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.pos
    }

    /// Ray through the sensor sample `(u, v)`, nominally in `[-1, 1]`.
    pub fn sample_ray(&self, u: f32, v: f32) -> Ray {
        let direction = match self.mode {
            CameraMode::PinholeGather => {
                let pinhole_pos = self.pos + self.forward;
                let sensor_pos = self.pos + u * self.right + v * self.up;
                (pinhole_pos - sensor_pos).normalize()
            }
            CameraMode::ForwardOffset => {
                (self.forward + u * self.right + v * self.up).normalize()
            }
        };

        Ray::new(self.pos, direction)
    }
}
