// src/encode/mod.rs

//! The four band codecs and the dispatch between them.
//!
//! Encoding is chosen explicitly through [`Codec`]; decoding reads the magic
//! tag at the front of the stream and hands the rest to the matching codec.

pub mod cac;
pub mod dct;
pub mod delta;
pub mod rle;

pub use cac::CacParams;
pub use dct::DctParams;
pub use delta::DeltaParams;
pub use rle::RleParams;

use crate::container::header::{ContainerHeader, read_utf};
use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use log::info;
use std::fmt;
use std::io::{Cursor, Read, Write};

/// Identifies one of the four codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    Cac,
    Dct,
    Delta,
    Rle,
}

impl CodecKind {
    pub const ALL: [CodecKind; 4] = [CodecKind::Cac, CodecKind::Dct, CodecKind::Delta, CodecKind::Rle];

    /// Tag written at the start of every stream produced by this codec.
    pub const fn magic(self) -> &'static str {
        match self {
            CodecKind::Cac => "CAC",
            CodecKind::Dct => "DCT",
            CodecKind::Delta => "Delta",
            CodecKind::Rle => "RLE",
        }
    }

    pub fn from_magic(magic: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.magic() == magic)
            .ok_or_else(|| CodecError::Format(format!("unknown magic tag {:?}", magic)))
    }

    /// Returns the codec that wrote `data`, if its leading magic tag is known.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        let magic = read_utf(&mut Cursor::new(data)).ok()?;
        Self::from_magic(&magic).ok()
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.magic())
    }
}

/// A codec together with the parameters it encodes with.
#[derive(Debug, Clone, PartialEq)]
pub enum Codec {
    Cac(CacParams),
    Dct(DctParams),
    Delta(DeltaParams),
    Rle(RleParams),
}

impl Codec {
    pub fn kind(&self) -> CodecKind {
        match self {
            Codec::Cac(_) => CodecKind::Cac,
            Codec::Dct(_) => CodecKind::Dct,
            Codec::Delta(_) => CodecKind::Delta,
            Codec::Rle(_) => CodecKind::Rle,
        }
    }

    /// Checks the parameters without encoding anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Codec::Cac(params) => params.validate(),
            Codec::Dct(params) => params.validate(),
            Codec::Delta(params) => params.validate(),
            Codec::Rle(_) => Ok(()),
        }
    }

    pub fn encode<W: Write>(&self, image: &DynamicImage, writer: W) -> Result<()> {
        match self {
            Codec::Cac(params) => cac::encode(image, params, writer),
            Codec::Dct(params) => dct::encode(image, params, writer),
            Codec::Delta(params) => delta::encode(image, params, writer),
            Codec::Rle(params) => rle::encode(image, params, writer),
        }
    }

    pub fn encode_to_vec(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(image, &mut out)?;
        info!(
            "{} encoded {}x{} image into {} bytes",
            self.kind(),
            image.width(),
            image.height(),
            out.len()
        );
        Ok(out)
    }
}

/// Decodes a stream written by any of the codecs.
pub fn decode<R: Read>(mut reader: R) -> Result<DynamicImage> {
    let header = ContainerHeader::read(&mut reader)?;
    decode_payload(&header, reader)
}

pub fn decode_from_slice(data: &[u8]) -> Result<DynamicImage> {
    decode(Cursor::new(data))
}

/// Decodes what follows an already parsed common header.
pub fn decode_payload<R: Read>(header: &ContainerHeader, reader: R) -> Result<DynamicImage> {
    match header.kind {
        CodecKind::Cac => cac::decode_payload(header, reader),
        CodecKind::Dct => dct::decode_payload(header, reader),
        CodecKind::Delta => delta::decode_payload(header, reader),
        CodecKind::Rle => rle::decode_payload(header, reader),
    }
}

/// Encodes independent images with the same codec, returning results in
/// input order. Each image gets its own output buffer.
#[cfg(feature = "rayon")]
pub fn encode_batch(codec: &Codec, images: &[DynamicImage]) -> Vec<Result<Vec<u8>>> {
    use rayon::prelude::*;
    images.par_iter().map(|image| codec.encode_to_vec(image)).collect()
}

/// Encodes independent images with the same codec, returning results in
/// input order. Each image gets its own output buffer.
#[cfg(not(feature = "rayon"))]
pub fn encode_batch(codec: &Codec, images: &[DynamicImage]) -> Vec<Result<Vec<u8>>> {
    images.iter().map(|image| codec.encode_to_vec(image)).collect()
}
