//! Memories attached to the orbiting comets.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An image and caption revealed when a comet is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Path to the image file, relative to the asset directory.
    pub image: PathBuf,
    /// Caption shown under the image.
    #[serde(default)]
    pub message: String,
}

impl Memory {
    /// Create a memory from an image path and caption.
    pub fn new(image: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            message: message.into(),
        }
    }
}
