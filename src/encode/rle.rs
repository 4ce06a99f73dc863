// src/encode/rle.rs

//! Bit-plane run-length coding.
//!
//! Each band is split into its eight bit planes, least significant first.
//! Every row of a plane is described as alternating runs, starting with a
//! run of set bits (possibly empty). A run length is written as a chain of
//! `255` bytes, each worth 255 samples, closed by one byte below 255. A
//! lone `0` is therefore an empty run, which just flips the bit value.
//!
//! Payload after the common header: `utf colorModel`, then for each band,
//! each plane and each row the run bytes. The coding is lossless.

use crate::container::header::{ContainerHeader, read_utf, write_utf};
use crate::encode::CodecKind;
use crate::image::band::Band;
use crate::image::color::{ColorModel, combine_bands, extract_bands};
use crate::image::pixel::normalize;
use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use bitvec::prelude::*;
use byteorder::{ReadBytesExt, WriteBytesExt};
use log::debug;
use std::io::{Read, Write};

/// Byte value that continues a run into the next byte.
const CHAIN: u8 = 255;
/// Planes per 8-bit band.
const PLANES: usize = 8;
/// Bit value of the first run of every row.
const FIRST_RUN_BIT: bool = true;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RleParams {
    pub color_model: ColorModel,
}

/// Writes one run length as a `255` chain plus its terminal byte.
pub fn write_run<W: Write>(writer: &mut W, mut len: usize) -> Result<()> {
    while len >= CHAIN as usize {
        writer.write_u8(CHAIN)?;
        len -= CHAIN as usize;
    }
    writer.write_u8(len as u8)?;
    Ok(())
}

/// Reads one run length written by [`write_run`].
pub fn read_run<R: Read>(reader: &mut R) -> Result<usize> {
    let mut len = 0usize;
    loop {
        let byte = reader.read_u8()?;
        len += byte as usize;
        if byte != CHAIN {
            return Ok(len);
        }
    }
}

pub fn encode<W: Write>(image: &DynamicImage, params: &RleParams, mut writer: W) -> Result<()> {
    let image = normalize(image);
    let header = ContainerHeader::for_image(CodecKind::Rle, &image)?;
    let bands = extract_bands(&image, params.color_model)?;

    header.write(&mut writer)?;
    write_utf(&mut writer, params.color_model.name())?;

    let mut runs = 0usize;
    for (index, band) in bands.iter().enumerate() {
        for plane in 0..PLANES {
            for y in 0..band.height() {
                runs += encode_row(band.row(y), plane, &mut writer)?;
            }
        }
        debug!("RLE band {}: {} runs so far", index, runs);
    }
    writer.flush()?;
    Ok(())
}

/// Emits the runs of bit `plane` across `row`, returning how many were written.
fn encode_row<W: Write>(row: &[u8], plane: usize, writer: &mut W) -> Result<usize> {
    let mut bits: BitVec<u8, Msb0> = BitVec::with_capacity(row.len());
    bits.extend(row.iter().map(|&s| s.view_bits::<Lsb0>()[plane]));

    let mut runs = 0;
    let mut state = FIRST_RUN_BIT;
    let mut rest = bits.as_bitslice();
    while !rest.is_empty() {
        let len = if state { rest.leading_ones() } else { rest.leading_zeros() };
        write_run(writer, len)?;
        rest = &rest[len..];
        state = !state;
        runs += 1;
    }
    Ok(runs)
}

pub fn decode<R: Read>(mut reader: R) -> Result<DynamicImage> {
    let header = ContainerHeader::read_expecting(&mut reader, CodecKind::Rle)?;
    decode_payload(&header, reader)
}

pub fn decode_payload<R: Read>(header: &ContainerHeader, mut reader: R) -> Result<DynamicImage> {
    let color_model = ColorModel::from_name(&read_utf(&mut reader)?)?;
    let mut bands = Vec::with_capacity(header.band_count());
    for _ in 0..header.band_count() {
        let mut band = Band::with_width(header.width());
        for plane in 0..PLANES {
            for y in 0..header.height() {
                // rows appear with the first plane, later planes fill in their bits
                if plane == 0 {
                    band.grow(1);
                }
                decode_row(band.row_mut(y), plane, &mut reader)?;
            }
        }
        bands.push(band);
    }
    combine_bands(&bands, color_model).map_err(|e| match e {
        CodecError::Input(msg) => CodecError::Format(msg),
        other => other,
    })
}

fn decode_row<R: Read>(row: &mut [u8], plane: usize, reader: &mut R) -> Result<()> {
    let mut state = FIRST_RUN_BIT;
    let mut x = 0;
    while x < row.len() {
        let len = read_run(reader)?;
        let end = x + len;
        if end > row.len() {
            return Err(CodecError::Format(format!(
                "run of {} overflows a row of {} samples at column {}",
                len,
                row.len(),
                x
            )));
        }
        for sample in &mut row[x..end] {
            sample.view_bits_mut::<Lsb0>().set(plane, state);
        }
        x = end;
        state = !state;
    }
    Ok(())
}
