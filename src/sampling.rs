use crate::error::RenderError;
use crate::ray::RaySet;
use crate::utils::lerp;
use nalgebra::Point3;
use rand::Rng;
use serde::Deserialize;

/// Scale applied to the uniform offsets drawn during hierarchical
/// refinement.
pub const REFINEMENT_JITTER: f64 = 0.1;

/// Policy for the coarse sampling pass.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    pub samples: usize,
    pub near: f64,
    pub far: f64,
    pub stratified: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples: 64,
            near: 0.0,
            far: 1.0,
            stratified: false,
        }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.samples < 2 {
            return Err(RenderError::invalid_config(format!(
                "need at least 2 samples per ray, got {}",
                self.samples
            )));
        }
        if !self.near.is_finite() || !self.far.is_finite() {
            return Err(RenderError::invalid_config("non-finite depth bounds"));
        }
        if self.far <= self.near {
            return Err(RenderError::invalid_config(format!(
                "far bound {} must exceed near bound {}",
                self.far, self.near
            )));
        }

        Ok(())
    }
}

/// Ascending depth rows for a batch of rays, one row per ray. Dimensions are
/// fixed at construction and threaded through every downstream contract, so
/// no component ever has to re-infer shapes from flattened buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    depths: Vec<Vec<f64>>,
    samples_per_ray: usize,
}

impl SampleGrid {
    /// Builds the coarse grid: an inclusive linspace over `[near, far]`,
    /// identical for every ray unless stratified jitter is enabled, in which
    /// case each ray draws one uniform offset per bin.
    pub fn coarse<R: Rng>(
        ray_count: usize,
        config: &SamplingConfig,
        rng: &mut R,
    ) -> Result<Self, RenderError> {
        config.validate()?;

        let n = config.samples;
        let depths = if config.stratified {
            let bin_width = (config.far - config.near) / n as f64;
            (0..ray_count)
                .map(|_| {
                    (0..n)
                        .map(|i| config.near + (i as f64 + rng.gen::<f64>()) * bin_width)
                        .collect()
                })
                .collect()
        } else {
            let row: Vec<f64> = (0..n)
                .map(|i| lerp(config.near, config.far, i as f64 / (n - 1) as f64))
                .collect();
            vec![row; ray_count]
        };

        Ok(Self {
            depths,
            samples_per_ray: n,
        })
    }

    pub fn ray_count(&self) -> usize {
        self.depths.len()
    }

    pub fn samples_per_ray(&self) -> usize {
        self.samples_per_ray
    }

    pub fn depth_rows(&self) -> &[Vec<f64>] {
        &self.depths
    }

    pub fn into_depth_rows(self) -> Vec<Vec<f64>> {
        self.depths
    }

    /// Flattens the grid into the `ray_count * samples_per_ray` point batch
    /// handed to the field evaluator, in row-major (ray, depth) order.
    pub fn points(&self, rays: &RaySet) -> Result<Vec<Point3<f64>>, RenderError> {
        if rays.len() != self.ray_count() {
            return Err(RenderError::ShapeMismatch {
                context: "ray batch",
                expected: self.ray_count(),
                actual: rays.len(),
            });
        }

        let mut points = Vec::with_capacity(self.ray_count() * self.samples_per_ray);
        for (ray, row) in rays.iter().zip(&self.depths) {
            points.extend(row.iter().map(|&t| ray.point_at(t)));
        }

        Ok(points)
    }

    /// Hierarchical refinement: doubles the sample count per ray by
    /// concatenating the coarse depths with a jittered copy and sorting.
    ///
    /// `importance` holds the per-ray coarse density sums. It is shape-checked
    /// but does not yet bias placement - the jittered copy is drawn uniformly,
    /// matching the coarse-to-fine behavior this renderer reproduces.
    /// TODO: draw the second half by inverse-CDF sampling of the per-sample
    /// weight distribution instead of uniform jitter.
    pub fn refine<R: Rng>(
        &self,
        importance: &[f64],
        jitter: f64,
        rng: &mut R,
    ) -> Result<Self, RenderError> {
        if importance.len() != self.ray_count() {
            return Err(RenderError::ShapeMismatch {
                context: "importance rows",
                expected: self.ray_count(),
                actual: importance.len(),
            });
        }

        let depths = self
            .depths
            .iter()
            .map(|row| {
                let mut refined = Vec::with_capacity(2 * row.len());
                refined.extend_from_slice(row);
                refined.extend(row.iter().map(|&t| t + rng.gen::<f64>() * jitter));
                refined.sort_unstable_by(f64::total_cmp);
                refined
            })
            .collect();

        Ok(Self {
            depths,
            samples_per_ray: 2 * self.samples_per_ray,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ray::Ray;
    use more_asserts::{assert_ge, assert_le};
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(samples: usize, near: f64, far: f64) -> SamplingConfig {
        SamplingConfig {
            samples,
            near,
            far,
            stratified: false,
        }
    }

    #[test]
    fn it_builds_an_inclusive_linspace() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = SampleGrid::coarse(3, &config(5, 1.0, 3.0), &mut rng).unwrap();

        assert_eq!(grid.ray_count(), 3);
        assert_eq!(grid.samples_per_ray(), 5);
        for row in grid.depth_rows() {
            assert_eq!(row, &[1.0, 1.5, 2.0, 2.5, 3.0]);
        }
    }

    #[test]
    fn it_stratifies_within_bins() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = SamplingConfig {
            stratified: true,
            ..config(4, 0.0, 1.0)
        };
        let grid = SampleGrid::coarse(2, &config, &mut rng).unwrap();

        for row in grid.depth_rows() {
            for (i, &t) in row.iter().enumerate() {
                assert_ge!(t, i as f64 * 0.25);
                assert_le!(t, (i + 1) as f64 * 0.25);
            }
        }
        assert_ne!(grid.depth_rows()[0], grid.depth_rows()[1]);
    }

    #[test]
    fn it_rejects_too_few_samples() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = SampleGrid::coarse(1, &config(1, 0.0, 1.0), &mut rng);

        assert!(matches!(
            result,
            Err(RenderError::InvalidSamplingConfig { .. })
        ));
    }

    #[test]
    fn it_rejects_an_empty_depth_range() {
        let mut rng = StdRng::seed_from_u64(0);
        for (near, far) in [(1.0, 1.0), (2.0, 1.0), (0.0, f64::NAN)] {
            let result = SampleGrid::coarse(1, &config(4, near, far), &mut rng);
            assert!(matches!(
                result,
                Err(RenderError::InvalidSamplingConfig { .. })
            ));
        }
    }

    #[test]
    fn it_flattens_points_in_ray_major_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = SampleGrid::coarse(2, &config(2, 0.0, 1.0), &mut rng).unwrap();
        let rays = RaySet::new(vec![
            Ray::new(Point3::origin(), Vector3::from([0.0, 0.0, 1.0])),
            Ray::new(Point3::from([5.0, 0.0, 0.0]), Vector3::from([1.0, 0.0, 0.0])),
        ])
        .unwrap();

        let points = grid.points(&rays).unwrap();
        assert_eq!(
            points,
            [
                Point3::from([0.0, 0.0, 0.0]),
                Point3::from([0.0, 0.0, 1.0]),
                Point3::from([5.0, 0.0, 0.0]),
                Point3::from([6.0, 0.0, 0.0]),
            ]
        );
    }

    #[test]
    fn it_rejects_a_mismatched_ray_batch() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = SampleGrid::coarse(2, &config(2, 0.0, 1.0), &mut rng).unwrap();
        let rays = RaySet::new(vec![Ray::new(
            Point3::origin(),
            Vector3::from([0.0, 0.0, 1.0]),
        )])
        .unwrap();

        assert_eq!(
            grid.points(&rays).unwrap_err(),
            RenderError::ShapeMismatch {
                context: "ray batch",
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn it_refines_to_twice_the_samples_sorted() {
        let mut rng = StdRng::seed_from_u64(42);
        let grid = SampleGrid::coarse(4, &config(8, 0.0, 1.0), &mut rng).unwrap();
        let refined = grid
            .refine(&[1.0, 2.0, 3.0, 4.0], REFINEMENT_JITTER, &mut rng)
            .unwrap();

        assert_eq!(refined.ray_count(), 4);
        assert_eq!(refined.samples_per_ray(), 16);
        for row in refined.depth_rows() {
            assert_eq!(row.len(), 16);
            for pair in row.windows(2) {
                assert_le!(pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn it_keeps_the_coarse_depths_in_the_refined_set() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = SampleGrid::coarse(1, &config(4, 0.0, 1.0), &mut rng).unwrap();
        let refined = grid.refine(&[0.0], REFINEMENT_JITTER, &mut rng).unwrap();

        // The unperturbed coarse depths survive; only the appended copy is
        // jittered.
        for t in &grid.depth_rows()[0] {
            assert!(refined.depth_rows()[0].contains(t));
        }
    }

    #[test]
    fn it_is_deterministic_for_a_fixed_seed() {
        let config = SamplingConfig {
            stratified: true,
            ..config(16, 0.0, 2.0)
        };

        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let grid_a = SampleGrid::coarse(8, &config, &mut rng_a).unwrap();
        let grid_b = SampleGrid::coarse(8, &config, &mut rng_b).unwrap();
        assert_eq!(grid_a, grid_b);

        let importance = [1.0; 8];
        let fine_a = grid_a
            .refine(&importance, REFINEMENT_JITTER, &mut rng_a)
            .unwrap();
        let fine_b = grid_b
            .refine(&importance, REFINEMENT_JITTER, &mut rng_b)
            .unwrap();
        assert_eq!(fine_a, fine_b);
    }

    #[test]
    fn it_rejects_mismatched_importance_rows() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = SampleGrid::coarse(2, &config(4, 0.0, 1.0), &mut rng).unwrap();

        assert_eq!(
            grid.refine(&[1.0], REFINEMENT_JITTER, &mut rng).unwrap_err(),
            RenderError::ShapeMismatch {
                context: "importance rows",
                expected: 2,
                actual: 1,
            }
        );
    }
}
