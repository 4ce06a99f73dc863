// src/filters/mod.rs

//! Image-to-image transforms that sit next to the codecs.

pub mod dct_edge;

pub use dct_edge::{DctEdgeFilter, DctEdgeParams};

use crate::utils::error::Result;
use ::image::DynamicImage;

/// Turns one image into another.
pub trait ImageFilter {
    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage>;
}
