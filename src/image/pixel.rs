// src/image/pixel.rs

//! Pixel storage tags and normalisation of caller images.
//!
//! The codecs only work on two layouts: 8-bit single-band gray and 8-bit
//! three-band RGB. Anything else handed in as a `DynamicImage` is converted
//! to the closest of the two before band extraction.

use crate::utils::error::{CodecError, Result};
use ::image::DynamicImage;
use log::debug;
use std::borrow::Cow;

/// Pixel storage type written to every container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PixelType {
    /// Three 8-bit bands, red/green/blue.
    Rgb = 1,
    /// One 8-bit band.
    Gray = 10,
}

impl PixelType {
    /// The 32-bit tag stored in the header.
    #[inline]
    pub const fn tag(self) -> i32 {
        self as i32
    }

    pub fn from_tag(tag: i32) -> Result<Self> {
        match tag {
            1 => Ok(PixelType::Rgb),
            10 => Ok(PixelType::Gray),
            other => Err(CodecError::Format(format!("unknown pixel type tag {}", other))),
        }
    }

    #[inline]
    pub const fn band_count(self) -> usize {
        match self {
            PixelType::Rgb => 3,
            PixelType::Gray => 1,
        }
    }

    /// Pixel type an image will be stored as after [`normalize`].
    pub fn of(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(_) => PixelType::Gray,
            DynamicImage::ImageRgb8(_) => PixelType::Rgb,
            other if other.color().has_color() => PixelType::Rgb,
            _ => PixelType::Gray,
        }
    }
}

/// Converts `image` to 8-bit Luma or 8-bit RGB, borrowing when it already is one.
pub fn normalize(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        other => {
            debug!("Normalising {:?} image to 8-bit storage", other.color());
            match PixelType::of(other) {
                PixelType::Rgb => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
                PixelType::Gray => Cow::Owned(DynamicImage::ImageLuma8(other.to_luma8())),
            }
        }
    }
}

/// Returns the image dimensions as the 16-bit values the header stores,
/// rejecting empty images and images too large for the format.
pub fn checked_dimensions(image: &DynamicImage) -> Result<(u16, u16)> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(CodecError::Input(format!(
            "image is empty ({}x{})",
            width, height
        )));
    }
    let w = u16::try_from(width)
        .map_err(|_| CodecError::Input(format!("image width {} exceeds 65535", width)))?;
    let h = u16::try_from(height)
        .map_err(|_| CodecError::Input(format!("image height {} exceeds 65535", height)))?;
    Ok((w, h))
}
