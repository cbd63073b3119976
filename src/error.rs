use thiserror::Error;

/// Failures surfaced by the rendering core. None of these are retried
/// internally; the first error aborts the whole render call.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("invalid sampling config: {reason}")]
    InvalidSamplingConfig { reason: String },

    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("non-finite {quantity} at index {index}")]
    NonFiniteInput {
        quantity: &'static str,
        index: usize,
    },
}

impl RenderError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidSamplingConfig {
            reason: reason.into(),
        }
    }
}
