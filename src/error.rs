use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by `WizardController::generate`. Validation problems are
/// normally absorbed by the step gating; `Incomplete` only exists so the
/// public API stays safe when called out of order.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("document data is incomplete: the '{step}' step has unmet requirements")]
    Incomplete { step: &'static str },

    #[error("template '{template_id}' is not present in the template store")]
    TemplateNotFound { template_id: String },

    #[error("failed to render document: {0}")]
    Render(String),

    #[error("document generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("a document generation is already in progress")]
    InFlight,
}

/// Failures while turning an uploaded file into a `PhotoAsset`.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unsupported photo format '{0}' (expected png or jpeg)")]
    UnsupportedFormat(String),

    #[error("could not decode image data: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("preview worker failed: {0}")]
    Worker(String),
}

/// Failures from the template store boundary.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{template_id}' not found")]
    NotFound { template_id: String },

    #[error("failed to load template '{template_id}': {source}")]
    Io {
        template_id: String,
        #[source]
        source: std::io::Error,
    },
}
