//! Error types shared across Paperanim crates.

/// Failures outside the per-document recovery path: bad caller input and
/// video export. Document and match failures have their own kinds in the
/// scanner and compositor.
#[derive(Debug, thiserror::Error)]
pub enum AnimatorError {
    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using AnimatorError.
pub type AnimatorResult<T> = Result<T, AnimatorError>;

impl AnimatorError {
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
