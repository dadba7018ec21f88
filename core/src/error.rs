use thiserror::Error;

/// Errors that can occur while building or applying stencils.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CarveError {
    #[error("Carver vertex lies at or behind the camera plane (depth {depth})")]
    BehindCamera { depth: f64 },

    #[error("Edge mesh is not path shaped: vertex {vertex} has degree {degree}")]
    NotPathShaped { vertex: usize, degree: usize },

    #[error("No usable geometry: {0}")]
    NoGeometry(String),

    #[error("Shape cannot be triangulated: {0}")]
    NotTriangulable(String),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Host operation failed: {0}")]
    Host(String),
}

impl CarveError {
    /// Local failures that skip one carver or shape instead of aborting the batch.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            CarveError::NotPathShaped { .. }
                | CarveError::NoGeometry(_)
                | CarveError::NotTriangulable(_)
                | CarveError::InvalidShape(_)
        )
    }
}

/// Result type for carve operations.
pub type CarveResult<T> = Result<T, CarveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skippable_kinds() {
        assert!(CarveError::NoGeometry("empty".into()).is_skippable());
        assert!(CarveError::NotPathShaped { vertex: 0, degree: 3 }.is_skippable());
        assert!(!CarveError::BehindCamera { depth: 0.0 }.is_skippable());
        assert!(!CarveError::InvalidGeometry("bad".into()).is_skippable());
        assert!(!CarveError::Host("gone".into()).is_skippable());
    }
}
