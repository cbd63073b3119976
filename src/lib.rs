#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::too_many_lines,
    clippy::wildcard_imports
)]

mod compositing;
mod error;
mod field;
mod ray;
mod render;
mod sampling;
mod scene;
mod utils;

pub use crate::compositing::{
    composite_ray, composite_rays, ensure_finite, RayComposite, TRANSMITTANCE_EPSILON,
};
pub use crate::error::RenderError;
pub use crate::field::{AnalyticField, FieldEvaluator, FieldObject, RawSample};
pub use crate::ray::{Ray, RaySet};
pub use crate::render::{Camera, RenderOptions, RenderPipeline, RenderResult};
pub use crate::sampling::{SampleGrid, SamplingConfig, REFINEMENT_JITTER};
pub use crate::scene::Scene;
