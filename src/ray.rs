use crate::error::RenderError;
use nalgebra::{Point3, Vector3};

/// A half-line along which depth samples are taken. The direction is not
/// normalized on construction - its scale defines the parameterization of
/// depth, so `point_at(t)` is always `origin + t * direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + t * self.direction
    }
}

/// A batch of rays rendered together. Pure data; construction validates that
/// every component is finite and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct RaySet {
    rays: Vec<Ray>,
}

impl RaySet {
    pub fn new(rays: Vec<Ray>) -> Result<Self, RenderError> {
        for (index, ray) in rays.iter().enumerate() {
            if !ray.origin.coords.iter().all(|c| c.is_finite()) {
                return Err(RenderError::NonFiniteInput {
                    quantity: "ray origin",
                    index,
                });
            }
            if !ray.direction.iter().all(|c| c.is_finite()) {
                return Err(RenderError::NonFiniteInput {
                    quantity: "ray direction",
                    index,
                });
            }
        }

        Ok(Self { rays })
    }

    pub fn len(&self) -> usize {
        self.rays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ray> {
        self.rays.iter()
    }

    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }
}
