use nalgebra::{Point3, Vector3};
use num_traits::identities::Zero;
use serde::Deserialize;

/// Raw field output for a single sample point: radiance plus a density that
/// is treated as a local attenuation rate. Density is deliberately left
/// unclamped here; the compositor's alpha transform tolerates arbitrary
/// finite values, including negatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub color: Vector3<f64>,
    pub density: f64,
}

impl RawSample {
    pub fn new(color: Vector3<f64>, density: f64) -> Self {
        Self { color, density }
    }
}

/// The radiance/density field queried by the render pipeline. Implementations
/// may hold trainable state internally; from the pipeline's perspective the
/// call is pure and must return exactly one sample per input point.
pub trait FieldEvaluator: Sync {
    fn evaluate(&self, points: &[Point3<f64>]) -> Vec<RawSample>;
}

/// Analytic density primitives, usable as scene JSON objects so the pipeline
/// can be exercised without any trained model.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldObject {
    /// Gaussian density falloff around a center point.
    Blob {
        center: Point3<f64>,
        radius: f64,
        density: f64,
        color: Vector3<f64>,
    },
    /// Uniform participating medium filling all of space.
    Constant { density: f64, color: Vector3<f64> },
}

impl FieldObject {
    fn density_at(&self, point: &Point3<f64>) -> f64 {
        match *self {
            FieldObject::Blob {
                center,
                radius,
                density,
                ..
            } => {
                let distance_squared = (point - center).norm_squared();
                density * (-distance_squared / (radius * radius)).exp()
            }
            FieldObject::Constant { density, .. } => density,
        }
    }

    fn color(&self) -> Vector3<f64> {
        match *self {
            FieldObject::Blob { color, .. } | FieldObject::Constant { color, .. } => color,
        }
    }
}

/// A field built from analytic primitives. Densities add; the radiance at a
/// point is the density-weighted mix of the contributing objects' colors.
#[derive(Debug, Clone, Default)]
pub struct AnalyticField {
    objects: Vec<FieldObject>,
}

impl AnalyticField {
    pub fn new(objects: Vec<FieldObject>) -> Self {
        Self { objects }
    }

    fn sample_at(&self, point: &Point3<f64>) -> RawSample {
        let mut total_density = 0.0;
        let mut color = Vector3::zero();
        for object in &self.objects {
            let density = object.density_at(point);
            total_density += density;
            color += density * object.color();
        }

        if total_density > 0.0 {
            color /= total_density;
        }

        RawSample::new(color, total_density)
    }
}

impl FieldEvaluator for AnalyticField {
    fn evaluate(&self, points: &[Point3<f64>]) -> Vec<RawSample> {
        points.iter().map(|point| self.sample_at(point)).collect()
    }
}
