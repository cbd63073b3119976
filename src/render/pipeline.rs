use crate::compositing::{composite_rays, RayComposite};
use crate::error::RenderError;
use crate::field::{FieldEvaluator, RawSample};
use crate::ray::RaySet;
use crate::sampling::{SampleGrid, SamplingConfig, REFINEMENT_JITTER};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Everything a render call produces: the accumulated colors of both passes
/// plus the weight and depth arrays behind them, which downstream consumers
/// (training losses, diagnostics) need alongside the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub coarse_color: Vec<Vector3<f64>>,
    pub fine_color: Vec<Vector3<f64>>,
    pub coarse_weights: Vec<Vec<f64>>,
    pub coarse_depths: Vec<Vec<f64>>,
    pub fine_weights: Vec<Vec<f64>>,
    pub fine_depths: Vec<Vec<f64>>,
}

/// The coarse-to-fine orchestrator. One `render` call runs
/// sample -> evaluate -> composite -> refine -> evaluate -> composite as a
/// single-shot linear sequence; the first failing step aborts the call and
/// surfaces its error untouched.
///
/// The pipeline holds no per-call state - every render allocates fresh
/// grids and discards them, and determinism comes from the owned seed.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    config: SamplingConfig,
    seed: u64,
}

impl RenderPipeline {
    pub fn new(config: SamplingConfig) -> Self {
        Self { config, seed: 0 }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn render<F: FieldEvaluator + ?Sized>(
        &self,
        field: &F,
        rays: &RaySet,
    ) -> Result<RenderResult, RenderError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.render_with_rng(field, rays, &mut rng)
    }

    /// As `render`, but drawing jitter from a caller-owned generator. This is
    /// the seam tests and batched callers use to control randomness.
    pub fn render_with_rng<F: FieldEvaluator + ?Sized, R: Rng>(
        &self,
        field: &F,
        rays: &RaySet,
        rng: &mut R,
    ) -> Result<RenderResult, RenderError> {
        let coarse_grid = SampleGrid::coarse(rays.len(), &self.config, rng)?;
        let coarse_raw = evaluate_checked(field, &coarse_grid.points(rays)?)?;
        let coarse = composite_rays(
            &coarse_raw,
            coarse_grid.ray_count(),
            coarse_grid.samples_per_ray(),
        )?;

        // Per-ray sums of raw coarse densities, handed to refinement as its
        // importance signal.
        let importance: Vec<f64> = coarse_raw
            .chunks(coarse_grid.samples_per_ray())
            .map(|row| row.iter().map(|sample| sample.density).sum())
            .collect();

        let fine_grid = coarse_grid.refine(&importance, REFINEMENT_JITTER, rng)?;
        let fine_raw = evaluate_checked(field, &fine_grid.points(rays)?)?;
        let fine = composite_rays(
            &fine_raw,
            fine_grid.ray_count(),
            fine_grid.samples_per_ray(),
        )?;

        let (coarse_color, coarse_weights) = split_composites(coarse);
        let (fine_color, fine_weights) = split_composites(fine);

        Ok(RenderResult {
            coarse_color,
            fine_color,
            coarse_weights,
            coarse_depths: coarse_grid.into_depth_rows(),
            fine_weights,
            fine_depths: fine_grid.into_depth_rows(),
        })
    }
}

fn evaluate_checked<F: FieldEvaluator + ?Sized>(
    field: &F,
    points: &[Point3<f64>],
) -> Result<Vec<RawSample>, RenderError> {
    let raw = field.evaluate(points);
    if raw.len() != points.len() {
        return Err(RenderError::ShapeMismatch {
            context: "field evaluation",
            expected: points.len(),
            actual: raw.len(),
        });
    }

    Ok(raw)
}

fn split_composites(composites: Vec<RayComposite>) -> (Vec<Vector3<f64>>, Vec<Vec<f64>>) {
    composites
        .into_iter()
        .map(|composite| (composite.color, composite.weights))
        .unzip()
}
