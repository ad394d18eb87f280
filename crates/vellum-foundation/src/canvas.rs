//! Canvas geometry
//!
//! The canvas dimensions are supplied by the embedder's configuration and
//! drive the sampling ranges for positions and varying field values.

use serde::{Deserialize, Serialize};

/// Canvas dimensions in output units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 700.0,
        }
    }
}
