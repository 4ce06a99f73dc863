// src/container/header.rs

//! The header shared by every codec stream.
//!
//! Layout (big-endian):
//!
//! ```text
//! utf   magic        u16 length + bytes ("CAC", "DCT", "Delta", "RLE")
//! u16   width
//! u16   height
//! i32   pixel type   1 = RGB, 10 = gray
//! ...   codec-specific fields
//! ```
//!
//! Strings use the same length-prefixed encoding for the magic tag and the
//! colour model names that some codecs append.

use crate::encode::CodecKind;
use crate::image::pixel::{PixelType, checked_dimensions};
use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::io::{Read, Write};

/// Header fields common to all four codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub kind: CodecKind,
    pub width: u16,
    pub height: u16,
    pub pixel_type: PixelType,
}

impl ContainerHeader {
    /// Builds the header describing `image` once it is stored by `kind`.
    pub fn for_image(kind: CodecKind, image: &DynamicImage) -> Result<Self> {
        let (width, height) = checked_dimensions(image)?;
        Ok(Self {
            kind,
            width,
            height,
            pixel_type: PixelType::of(image),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    #[inline]
    pub fn band_count(&self) -> usize {
        self.pixel_type.band_count()
    }

    /// Writes the magic tag and the common fields.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_utf(writer, self.kind.magic())?;
        writer.write_u16::<BigEndian>(self.width)?;
        writer.write_u16::<BigEndian>(self.height)?;
        writer.write_i32::<BigEndian>(self.pixel_type.tag())?;
        Ok(())
    }

    /// Reads a header written by any codec.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = read_utf(reader)?;
        let kind = CodecKind::from_magic(&magic)?;
        Self::read_fields(kind, reader)
    }

    /// Reads a header, failing before anything past the magic tag is touched
    /// if the stream was not written by `kind`.
    pub fn read_expecting<R: Read>(reader: &mut R, kind: CodecKind) -> Result<Self> {
        let magic = read_utf(reader)?;
        if magic != kind.magic() {
            return Err(CodecError::MagicMismatch {
                expected: kind.magic(),
                found: magic,
            });
        }
        Self::read_fields(kind, reader)
    }

    /// Reads the fields following an already consumed magic tag.
    pub fn read_fields<R: Read>(kind: CodecKind, reader: &mut R) -> Result<Self> {
        let width = reader.read_u16::<BigEndian>()?;
        let height = reader.read_u16::<BigEndian>()?;
        let pixel_type = PixelType::from_tag(reader.read_i32::<BigEndian>()?)?;
        if width == 0 || height == 0 {
            return Err(CodecError::Format(format!(
                "header declares an empty {}x{} image",
                width, height
            )));
        }
        debug!(
            "{} header: {}x{}, {:?}",
            kind.magic(),
            width,
            height,
            pixel_type
        );
        Ok(Self {
            kind,
            width,
            height,
            pixel_type,
        })
    }
}

/// Writes a string as a big-endian u16 byte length followed by its UTF-8 bytes.
pub fn write_utf<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| CodecError::Input(format!("string of {} bytes is too long", value.len())))?;
    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Reads a string written by [`write_utf`].
pub fn read_utf<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|_| CodecError::Format("string field is not valid UTF-8".to_string()))
}
