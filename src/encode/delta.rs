// src/encode/delta.rs

//! Per-row differential coding with one-bit steps.
//!
//! Every row starts with its first sample stored as a whole byte. Each
//! following sample costs one bit: `1` when it lies above the running
//! prediction (which then moves up by the band's step), `0` otherwise (the
//! prediction moves down). The decoder replays the same walk.
//!
//! Payload after the common header: `utf colorModel`, three `f64` steps,
//! then the row streams of each band. Leading samples are byte aligned, so
//! a row takes `1 + ceil((width - 1) / 8)` bytes.

use crate::container::bit_stream::{BitReader, BitWriter};
use crate::container::header::{ContainerHeader, read_utf, write_utf};
use crate::encode::CodecKind;
use crate::image::band::Band;
use crate::image::color::{ColorModel, combine_bands, extract_bands};
use crate::image::pixel::normalize;
use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct DeltaParams {
    pub color_model: ColorModel,
    /// Prediction step per band.
    pub steps: [f64; 3],
}

impl Default for DeltaParams {
    fn default() -> Self {
        Self {
            color_model: ColorModel::Rgb,
            steps: [4.0; 3],
        }
    }
}

impl DeltaParams {
    pub fn validate(&self) -> Result<()> {
        match self.steps.iter().position(|&s| !valid_step(s)) {
            Some(band) => Err(CodecError::Input(format!(
                "band {} step must be a positive number, got {}",
                band, self.steps[band]
            ))),
            None => Ok(()),
        }
    }
}

#[inline]
fn valid_step(step: f64) -> bool {
    step.is_finite() && step > 0.0
}

pub fn encode<W: Write>(image: &DynamicImage, params: &DeltaParams, mut writer: W) -> Result<()> {
    params.validate()?;
    let image = normalize(image);
    let header = ContainerHeader::for_image(CodecKind::Delta, &image)?;
    let bands = extract_bands(&image, params.color_model)?;

    header.write(&mut writer)?;
    write_utf(&mut writer, params.color_model.name())?;
    for &step in &params.steps {
        writer.write_f64::<BigEndian>(step)?;
    }

    let mut bits = BitWriter::new(writer);
    for (index, band) in bands.iter().enumerate() {
        let step = params.steps[index];
        debug!("Delta band {}: {} rows, step {}", index, band.height(), step);
        for y in 0..band.height() {
            encode_row(band.row(y), step, &mut bits)?;
        }
    }
    bits.finish()?;
    Ok(())
}

fn encode_row<W: Write>(row: &[u8], step: f64, bits: &mut BitWriter<W>) -> Result<()> {
    let Some((&first, rest)) = row.split_first() else {
        return Ok(());
    };
    bits.write_u8(first)?;
    let mut prediction = first as f64;
    for &sample in rest {
        let up = sample as f64 > prediction;
        bits.write_bit(up)?;
        prediction += if up { step } else { -step };
    }
    Ok(())
}

pub fn decode<R: Read>(mut reader: R) -> Result<DynamicImage> {
    let header = ContainerHeader::read_expecting(&mut reader, CodecKind::Delta)?;
    decode_payload(&header, reader)
}

pub fn decode_payload<R: Read>(header: &ContainerHeader, mut reader: R) -> Result<DynamicImage> {
    let color_model = ColorModel::from_name(&read_utf(&mut reader)?)?;
    let mut steps = [0f64; 3];
    for step in steps.iter_mut() {
        *step = reader.read_f64::<BigEndian>()?;
        if !valid_step(*step) {
            return Err(CodecError::Format(format!("invalid step {}", step)));
        }
    }
    debug!("Delta steps {:?}, model {}", steps, color_model);

    let mut bits = BitReader::new(reader);
    let mut bands = Vec::with_capacity(header.band_count());
    for &step in steps.iter().take(header.band_count()) {
        let mut band = Band::with_width(header.width());
        for y in 0..header.height() {
            band.grow(1);
            decode_row(band.row_mut(y), step, &mut bits)?;
        }
        bands.push(band);
    }
    combine_bands(&bands, color_model).map_err(|e| match e {
        CodecError::Input(msg) => CodecError::Format(msg),
        other => other,
    })
}

fn decode_row<R: Read>(row: &mut [u8], step: f64, bits: &mut BitReader<R>) -> Result<()> {
    let Some((first, rest)) = row.split_first_mut() else {
        return Ok(());
    };
    *first = bits.read_u8()?;
    let mut value = *first as f64;
    for sample in rest {
        value += if bits.read_bit()? { step } else { -step };
        *sample = value.round().clamp(0.0, 255.0) as u8;
    }
    Ok(())
}
