use nalgebra::Vector3;
use num_traits::Float;

pub fn lerp<F: Float>(x0: F, x1: F, t: F) -> F {
    x0 - x0 * t + x1 * t
}

pub fn remap_value<F: Float>(num: F, domain: (F, F), range: (F, F)) -> F {
    assert!(domain.0 < domain.1, "domain values must be of the form (min, max) - range values can be swapped for this behavior");

    (num - domain.0) * (range.1 - range.0) / (domain.1 - domain.0) + range.0
}

pub fn gamma_correct(color: Vector3<f64>, gamma: f64) -> Vector3<f64> {
    color.map(|c| c.powf(1.0 / gamma))
}
