//! Error types for scene construction.

use thiserror::Error;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while building the scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("invalid orbit: {0}")]
    InvalidOrbit(String),

    #[error("invalid scene settings: {0}")]
    InvalidSettings(String),
}
