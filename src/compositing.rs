use crate::error::RenderError;
use crate::field::RawSample;
use nalgebra::Vector3;
use num_traits::identities::Zero;
use rayon::prelude::*;

/// Guard added to each per-sample survival factor so a single fully opaque
/// sample cannot collapse the transmittance to exactly zero for every sample
/// behind it.
pub const TRANSMITTANCE_EPSILON: f64 = 1e-10;

/// Accumulated color for one ray plus the per-sample weight distribution
/// that produced it. The weights are needed by the refinement pass and by
/// training/diagnostic consumers, so they are always returned.
#[derive(Debug, Clone, PartialEq)]
pub struct RayComposite {
    pub color: Vector3<f64>,
    pub weights: Vec<f64>,
}

/// Composites one ray's ordered samples front to back.
///
/// `alpha = 1 - exp(-density)` treats the raw density directly as an
/// attenuation coefficient per unit step; it is not scaled by the distance
/// between samples. That simplification is reproduced deliberately - see
/// DESIGN.md before changing it, since segment-length scaling alters every
/// rendered color.
pub fn composite_ray(samples: &[RawSample]) -> RayComposite {
    let mut color = Vector3::zero();
    let mut weights = Vec::with_capacity(samples.len());
    let mut transmittance = 1.0;

    for sample in samples {
        let alpha = 1.0 - (-sample.density).exp();
        let weight = alpha * transmittance;

        color += weight * sample.color;
        weights.push(weight);
        transmittance *= 1.0 - alpha + TRANSMITTANCE_EPSILON;
    }

    RayComposite { color, weights }
}

/// Composites a flattened `ray_count * samples_per_ray` batch, in parallel
/// across rays. A zero-ray or zero-sample batch composites vacuously to an
/// empty result.
pub fn composite_rays(
    samples: &[RawSample],
    ray_count: usize,
    samples_per_ray: usize,
) -> Result<Vec<RayComposite>, RenderError> {
    if ray_count == 0 || samples_per_ray == 0 {
        return Ok(Vec::new());
    }
    if samples.len() != ray_count * samples_per_ray {
        return Err(RenderError::ShapeMismatch {
            context: "raw sample batch",
            expected: ray_count * samples_per_ray,
            actual: samples.len(),
        });
    }
    ensure_finite(samples)?;

    Ok(samples
        .par_chunks(samples_per_ray)
        .map(composite_ray)
        .collect())
}

/// Defensive scan run before compositing. The epsilon guard in the
/// transmittance product exists for legitimate degenerate inputs (a fully
/// opaque sample), not to mask NaN/Inf leaking out of a field evaluator.
pub fn ensure_finite(samples: &[RawSample]) -> Result<(), RenderError> {
    for (index, sample) in samples.iter().enumerate() {
        if !sample.density.is_finite() {
            return Err(RenderError::NonFiniteInput {
                quantity: "density",
                index,
            });
        }
        if !sample.color.iter().all(|c| c.is_finite()) {
            return Err(RenderError::NonFiniteInput {
                quantity: "color",
                index,
            });
        }
    }

    Ok(())
}
