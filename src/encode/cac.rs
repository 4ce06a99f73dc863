// src/encode/cac.rs

//! Quadtree region coding.
//!
//! Each band is coded by recursively testing rectangular regions for
//! homogeneity. A homogeneous region (standard deviation around its rounded
//! mean within the band's tolerance) is stored as a single byte holding the
//! mean. Anything else is stored as a `0` split marker followed by its four
//! children, in the order top-right, top-left, bottom-left, bottom-right.
//!
//! Since `0` marks a split, a homogeneous region whose mean is 0 is stored
//! as 1. All-black areas therefore decode one unit brighter.
//!
//! Payload after the common header: `utf colorModel`, then the region stream
//! of each band in order.

use crate::container::header::{ContainerHeader, read_utf, write_utf};
use crate::encode::CodecKind;
use crate::image::band::Band;
use crate::image::color::{ColorModel, combine_bands, extract_bands};
use crate::image::pixel::normalize;
use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use byteorder::{ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use std::io::{Read, Write};

/// Byte that introduces the four children of a split region.
const SPLIT_MARKER: u8 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct CacParams {
    pub color_model: ColorModel,
    /// Largest standard deviation at which a region is stored as its mean, per band.
    pub tolerances: [f64; 3],
}

impl Default for CacParams {
    fn default() -> Self {
        Self {
            color_model: ColorModel::Rgb,
            tolerances: [5.0; 3],
        }
    }
}

impl CacParams {
    pub fn validate(&self) -> Result<()> {
        for (band, &tolerance) in self.tolerances.iter().enumerate() {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(CodecError::Input(format!(
                    "band {} tolerance must be a non-negative number, got {}",
                    band, tolerance
                )));
            }
        }
        Ok(())
    }
}

/// An axis-aligned rectangle of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn full(band: &Band) -> Self {
        Self {
            x: 0,
            y: 0,
            width: band.width(),
            height: band.height(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The four quadrants in coding order: top-right, top-left, bottom-left,
    /// bottom-right. Right and bottom quadrants take the odd remainder.
    pub fn children(&self) -> [Region; 4] {
        let left_w = self.width / 2;
        let right_w = self.width - left_w;
        let top_h = self.height / 2;
        let bottom_h = self.height - top_h;
        let mid_x = self.x + left_w;
        let mid_y = self.y + top_h;
        [
            Region { x: mid_x, y: self.y, width: right_w, height: top_h },
            Region { x: self.x, y: self.y, width: left_w, height: top_h },
            Region { x: self.x, y: mid_y, width: left_w, height: bottom_h },
            Region { x: mid_x, y: mid_y, width: right_w, height: bottom_h },
        ]
    }

    fn samples<'a>(&self, band: &'a Band) -> impl Iterator<Item = u8> + 'a {
        let Region { x, y, width, height } = *self;
        (y..y + height).flat_map(move |row| band.row(row)[x..x + width].iter().copied())
    }

    fn area(&self) -> f64 {
        (self.width * self.height) as f64
    }

    /// Mean sample value, rounded to the nearest integer.
    pub fn average(&self, band: &Band) -> u8 {
        let sum: u64 = self.samples(band).map(u64::from).sum();
        (sum as f64 / self.area()).round() as u8
    }

    /// Root mean square deviation of the samples from `mean`.
    pub fn deviation(&self, band: &Band, mean: u8) -> f64 {
        let mean = mean as f64;
        let squares: f64 = self
            .samples(band)
            .map(|s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum();
        (squares / self.area()).sqrt()
    }
}

pub fn encode<W: Write>(image: &DynamicImage, params: &CacParams, mut writer: W) -> Result<()> {
    params.validate()?;
    let image = normalize(image);
    let header = ContainerHeader::for_image(CodecKind::Cac, &image)?;
    let bands = extract_bands(&image, params.color_model)?;

    header.write(&mut writer)?;
    write_utf(&mut writer, params.color_model.name())?;

    for (index, band) in bands.iter().enumerate() {
        let tolerance = params.tolerances[index];
        let mut stats = RegionStats::default();
        encode_region(band, Region::full(band), tolerance, &mut writer, &mut stats)?;
        debug!(
            "CAC band {}: {} leaves, {} splits (tolerance {})",
            index, stats.leaves, stats.splits, tolerance
        );
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Default)]
struct RegionStats {
    leaves: usize,
    splits: usize,
}

fn encode_region<W: Write>(
    band: &Band,
    region: Region,
    tolerance: f64,
    writer: &mut W,
    stats: &mut RegionStats,
) -> Result<()> {
    if region.is_empty() {
        return Ok(());
    }

    let average = region.average(band);
    if region.deviation(band, average) <= tolerance {
        trace!("CAC leaf {:?} = {}", region, average);
        writer.write_u8(average.max(1))?;
        stats.leaves += 1;
        return Ok(());
    }

    writer.write_u8(SPLIT_MARKER)?;
    stats.splits += 1;
    for child in region.children() {
        encode_region(band, child, tolerance, writer, stats)?;
    }
    Ok(())
}

pub fn decode<R: Read>(mut reader: R) -> Result<DynamicImage> {
    let header = ContainerHeader::read_expecting(&mut reader, CodecKind::Cac)?;
    decode_payload(&header, reader)
}

pub fn decode_payload<R: Read>(header: &ContainerHeader, mut reader: R) -> Result<DynamicImage> {
    let color_model = ColorModel::from_name(&read_utf(&mut reader)?)?;
    let mut bands = Vec::with_capacity(header.band_count());
    for _ in 0..header.band_count() {
        // allocate only once the root byte of the band is present
        let root = reader.read_u8()?;
        let mut band = Band::new(header.width(), header.height());
        let full = Region::full(&band);
        decode_node(&mut band, full, root, &mut reader)?;
        bands.push(band);
    }
    combine_bands(&bands, color_model).map_err(|e| match e {
        CodecError::Input(msg) => CodecError::Format(msg),
        other => other,
    })
}

fn decode_region<R: Read>(band: &mut Band, region: Region, reader: &mut R) -> Result<()> {
    if region.is_empty() {
        return Ok(());
    }
    let sample = reader.read_u8()?;
    decode_node(band, region, sample, reader)
}

/// Applies the already read byte `sample` to a non-empty `region`.
fn decode_node<R: Read>(band: &mut Band, region: Region, sample: u8, reader: &mut R) -> Result<()> {
    if sample != SPLIT_MARKER {
        band.fill_rect(region.x, region.y, region.width, region.height, sample);
        return Ok(());
    }

    // a single sample cannot be split: its only non-empty child is itself
    if region.width == 1 && region.height == 1 {
        return Err(CodecError::Format(format!(
            "split marker on the single-sample region at ({}, {})",
            region.x, region.y
        )));
    }
    trace!("CAC split {:?}", region);
    for child in region.children() {
        decode_region(band, child, reader)?;
    }
    Ok(())
}
