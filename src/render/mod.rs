mod pipeline;

use crate::error::RenderError;
use crate::ray::{Ray, RaySet};
use crate::sampling::SamplingConfig;
use crate::utils;
use nalgebra::{Matrix4, Point3, Unit, Vector3};
use serde::Deserialize;

pub use pipeline::{RenderPipeline, RenderResult};

pub const GAMMA: f64 = 2.2;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub fov: f64,
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Unit<Vector3<f64>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 65.0,
            position: Point3::from([0.0, 0.0, 1.0]),
            target: Point3::origin(),
            up: Vector3::y_axis(),
        }
    }
}

impl Camera {
    /// Builds one primary ray per pixel center, row-major, so a rendered
    /// color batch maps straight back onto the image.
    pub fn primary_rays(&self, width: u32, height: u32) -> Result<RaySet, RenderError> {
        let camera_to_world =
            Matrix4::look_at_rh(&self.position, &self.target, &self.up).transpose();
        let aspect = f64::from(width) / f64::from(height);
        let fov = (self.fov.to_radians() / 2.0).tan();

        let mut rays = Vec::with_capacity(width as usize * height as usize);
        for py in 0..height {
            for px in 0..width {
                let x = utils::remap_value(
                    f64::from(px) + 0.5,
                    (0.0, f64::from(width)),
                    (-1.0, 1.0),
                );
                let y = utils::remap_value(
                    f64::from(py) + 0.5,
                    (0.0, f64::from(height)),
                    (1.0, -1.0),
                );

                // Apply fov and scale to aspect ratio
                let (x, y) = if width < height {
                    (x * aspect, y)
                } else {
                    (x, y / aspect)
                };
                let (x, y) = (x * fov, y * fov);

                let direction = Vector3::from([x, y, -1.0]).normalize();
                let direction = (camera_to_world * direction.to_homogeneous()).xyz();

                rays.push(Ray::new(self.position, direction));
            }
        }

        RaySet::new(rays)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub sampling: SamplingConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: 0,
            sampling: SamplingConfig::default(),
        }
    }
}
