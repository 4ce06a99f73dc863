// src/encode/dct/mod.rs

//! Block transform coding.
//!
//! Every band is split into 8x8 tiles over a zero-padded grid whose size is
//! the next multiple of 8. Each tile goes through a 2D DCT-II and only the
//! first `N` coefficients in zig-zag order are stored, as big-endian `f32`.
//! The decoder treats the missing coefficients as zero, inverts the
//! transform and drops samples that fall in the padding.
//!
//! Payload after the common header: `i32 N`, then for each band the tiles in
//! row-major tile order, `N` coefficients each. The raw channels are coded;
//! there is no colour model.

pub mod transform;
pub mod zigzag;

use self::transform::DctBasis;
use self::zigzag::ZIGZAG;
use crate::container::header::ContainerHeader;
use crate::encode::CodecKind;
use crate::image::band::Band;
use crate::image::color::{ColorModel, combine_bands, extract_bands};
use crate::image::pixel::normalize;
use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use std::io::{Read, Write};

/// Tile edge length.
pub const TILE_SIZE: usize = 8;
/// Coefficients in one tile.
pub const TILE_COEFFS: usize = TILE_SIZE * TILE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DctParams {
    /// Number of zig-zag ordered coefficients kept per tile, 1..=64.
    pub coefficients: usize,
}

impl Default for DctParams {
    fn default() -> Self {
        Self { coefficients: 16 }
    }
}

impl DctParams {
    pub fn validate(&self) -> Result<()> {
        if !(1..=TILE_COEFFS).contains(&self.coefficients) {
            return Err(CodecError::Input(format!(
                "coefficient count must be within 1..=64, got {}",
                self.coefficients
            )));
        }
        Ok(())
    }
}

/// Number of tiles needed to cover `len` samples.
#[inline]
fn tile_count(len: usize) -> usize {
    len.div_ceil(TILE_SIZE)
}

pub fn encode<W: Write>(image: &DynamicImage, params: &DctParams, mut writer: W) -> Result<()> {
    params.validate()?;
    let image = normalize(image);
    let header = ContainerHeader::for_image(CodecKind::Dct, &image)?;
    let bands = extract_bands(&image, ColorModel::Rgb)?;

    header.write(&mut writer)?;
    writer.write_i32::<BigEndian>(params.coefficients as i32)?;

    let basis = DctBasis::new(TILE_SIZE);
    for (index, band) in bands.iter().enumerate() {
        let (tiles_x, tiles_y) = (tile_count(band.width()), tile_count(band.height()));
        debug!("DCT band {}: {}x{} tiles", index, tiles_x, tiles_y);
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let block = forward_tile(band, &basis, tx * TILE_SIZE, ty * TILE_SIZE);
                trace!("DCT tile ({}, {}) DC {}", tx, ty, block[0]);
                for &pos in &ZIGZAG[..params.coefficients] {
                    writer.write_f32::<BigEndian>(block[pos as usize])?;
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Transforms the tile whose top-left sample is (`x0`, `y0`), reading zero
/// outside the band.
fn forward_tile(band: &Band, basis: &DctBasis, x0: usize, y0: usize) -> [f32; TILE_COEFFS] {
    let mut block = [0f32; TILE_COEFFS];
    for row in 0..TILE_SIZE {
        for col in 0..TILE_SIZE {
            block[row * TILE_SIZE + col] = band.get_or_zero(x0 + col, y0 + row) as f32;
        }
    }
    basis.forward_2d(&mut block);
    block
}

pub fn decode<R: Read>(mut reader: R) -> Result<DynamicImage> {
    let header = ContainerHeader::read_expecting(&mut reader, CodecKind::Dct)?;
    decode_payload(&header, reader)
}

pub fn decode_payload<R: Read>(header: &ContainerHeader, mut reader: R) -> Result<DynamicImage> {
    let declared = reader.read_i32::<BigEndian>()?;
    let coefficients = usize::try_from(declared)
        .ok()
        .filter(|n| (1..=TILE_COEFFS).contains(n))
        .ok_or_else(|| CodecError::Format(format!("coefficient count {} out of range", declared)))?;

    let basis = DctBasis::new(TILE_SIZE);
    let (width, height) = (header.width(), header.height());
    let mut bands = Vec::with_capacity(header.band_count());
    for _ in 0..header.band_count() {
        let mut band = Band::with_width(width);
        for ty in 0..tile_count(height) {
            band.grow(TILE_SIZE.min(height - ty * TILE_SIZE));
            for tx in 0..tile_count(width) {
                let mut block = [0f32; TILE_COEFFS];
                for &pos in &ZIGZAG[..coefficients] {
                    block[pos as usize] = reader.read_f32::<BigEndian>()?;
                }
                basis.inverse_2d(&mut block);
                store_tile(&mut band, &block, tx * TILE_SIZE, ty * TILE_SIZE);
            }
        }
        bands.push(band);
    }
    combine_bands(&bands, ColorModel::Rgb)
}

/// Writes a reconstructed tile into the band, rounding and clamping each
/// sample and dropping the ones that land in the padding.
fn store_tile(band: &mut Band, block: &[f32; TILE_COEFFS], x0: usize, y0: usize) {
    let rows = TILE_SIZE.min(band.height() - y0);
    let cols = TILE_SIZE.min(band.width() - x0);
    for row in 0..rows {
        for col in 0..cols {
            let value = block[row * TILE_SIZE + col].round().clamp(0.0, 255.0) as u8;
            band.set(x0 + col, y0 + row, value);
        }
    }
}
