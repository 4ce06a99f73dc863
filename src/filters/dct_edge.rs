// src/filters/dct_edge.rs

//! Edge emphasis in the frequency domain.
//!
//! Each band is cut into zero-padded `T`x`T` tiles. Every tile is moved to
//! the DCT domain, coefficient `(u, v)` is scaled by
//! `offset + sqrt(u^2 + v^2) * strength / sqrt(2 T^2)`, and the tile is
//! transformed back. Low frequencies are damped and high ones boosted, so
//! with the default offset of 0 only edges survive.

use super::ImageFilter;
use crate::encode::dct::transform::DctBasis;
use crate::image::band::Band;
use crate::image::color::{ColorModel, combine_bands, extract_bands};
use crate::image::pixel::normalize;
use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct DctEdgeParams {
    /// Tile edge length.
    pub tile_size: usize,
    pub offset: f32,
    pub strength: f32,
}

impl Default for DctEdgeParams {
    fn default() -> Self {
        Self {
            tile_size: 20,
            offset: 0.0,
            strength: 8.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DctEdgeFilter {
    params: DctEdgeParams,
}

impl DctEdgeFilter {
    pub fn new(params: DctEdgeParams) -> Result<Self> {
        if params.tile_size == 0 {
            return Err(CodecError::Input("tile size must be at least 1".to_string()));
        }
        if !params.offset.is_finite() || !params.strength.is_finite() {
            return Err(CodecError::Input(format!(
                "offset and strength must be finite, got {} and {}",
                params.offset, params.strength
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &DctEdgeParams {
        &self.params
    }

    /// Row-major table of the factor applied to every coefficient of a tile.
    fn weights(&self) -> Vec<f32> {
        let t = self.params.tile_size;
        let norm = ((2 * t * t) as f32).sqrt();
        let mut weights = Vec::with_capacity(t * t);
        for v in 0..t {
            for u in 0..t {
                let radius = ((u * u + v * v) as f32).sqrt();
                weights.push(self.params.offset + radius * self.params.strength / norm);
            }
        }
        weights
    }

    fn filter_band(&self, band: &Band, basis: &DctBasis, weights: &[f32]) -> Band {
        let t = self.params.tile_size;
        let (w, h) = (band.width(), band.height());
        let mut out = Band::new(w, h);
        let mut block = vec![0f32; t * t];
        for y0 in (0..h).step_by(t) {
            for x0 in (0..w).step_by(t) {
                for row in 0..t {
                    for col in 0..t {
                        block[row * t + col] = band.get_or_zero(x0 + col, y0 + row) as f32;
                    }
                }
                basis.forward_2d(&mut block);
                for (c, &weight) in block.iter_mut().zip(weights) {
                    *c *= weight;
                }
                basis.inverse_2d(&mut block);
                for row in 0..t.min(h - y0) {
                    for col in 0..t.min(w - x0) {
                        let value = block[row * t + col].round().clamp(0.0, 255.0) as u8;
                        out.set(x0 + col, y0 + row, value);
                    }
                }
            }
        }
        out
    }
}

impl ImageFilter for DctEdgeFilter {
    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let image = normalize(image);
        let bands = extract_bands(&image, ColorModel::Rgb)?;
        let basis = DctBasis::new(self.params.tile_size);
        let weights = self.weights();
        debug!(
            "DCT edge filter: {} bands, {}x{} tiles",
            bands.len(),
            self.params.tile_size,
            self.params.tile_size
        );
        let filtered: Vec<Band> = bands
            .iter()
            .map(|band| self.filter_band(band, &basis, &weights))
            .collect();
        combine_bands(&filtered, ColorModel::Rgb)
    }
}
