use thiserror::Error;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum VizError {
    /// A chart specification could not be serialized.
    #[error("Chart serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type VizResult<T> = Result<T, VizError>;
