// src/image/color.rs

//! Colour models and band extraction.
//!
//! Every codec works on single-band sample grids. This module splits an image
//! into its bands under a [`ColorModel`] and merges decoded bands back into an
//! image. Under [`ColorModel::Rgb`] the bands are the raw channels; under
//! [`ColorModel::Hsb`] they are hue, saturation and brightness, each scaled
//! from `[0, 1]` to `[0, 255]`.

use super::band::Band;
use super::pixel::{PixelType, normalize};
use crate::utils::error::{CodecError, Result};
use ::image::{DynamicImage, GrayImage, RgbImage};
use std::fmt;
use std::str::FromStr;

/// Colour model used to derive bands from a three-band image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorModel {
    #[default]
    Rgb,
    Hsb,
}

impl ColorModel {
    /// Name written into container headers.
    pub const fn name(self) -> &'static str {
        match self {
            ColorModel::Rgb => "RGB",
            ColorModel::Hsb => "HSB",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "RGB" => Ok(ColorModel::Rgb),
            "HSB" => Ok(ColorModel::Hsb),
            other => Err(CodecError::Format(format!("unknown colour model {:?}", other))),
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorModel {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RGB" => Ok(ColorModel::Rgb),
            "HSB" | "HSV" => Ok(ColorModel::Hsb),
            _ => Err(CodecError::Input(format!("unknown colour model {:?}", s))),
        }
    }
}

/// Converts 8-bit RGB to hue, saturation and brightness in `[0, 1]`.
pub fn rgb_to_hsb(r: u8, g: u8, b: u8) -> [f32; 3] {
    let cmax = r.max(g).max(b) as f32;
    let cmin = r.min(g).min(b) as f32;
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let brightness = cmax / 255.0;
    let saturation = if cmax != 0.0 { (cmax - cmin) / cmax } else { 0.0 };

    let hue = if saturation == 0.0 {
        0.0
    } else {
        let span = cmax - cmin;
        let redc = (cmax - r) / span;
        let greenc = (cmax - g) / span;
        let bluec = (cmax - b) / span;
        let sector = if r == cmax {
            bluec - greenc
        } else if g == cmax {
            2.0 + redc - bluec
        } else {
            4.0 + greenc - redc
        };
        let mut hue = sector / 6.0;
        if hue < 0.0 {
            hue += 1.0;
        }
        hue
    };

    [hue, saturation, brightness]
}

/// Converts hue, saturation and brightness in `[0, 1]` back to 8-bit RGB.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> [u8; 3] {
    let to_u8 = |v: f32| (v * 255.0 + 0.5).clamp(0.0, 255.0) as u8;

    if saturation == 0.0 {
        let v = to_u8(brightness);
        return [v, v, v];
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };
    [to_u8(r), to_u8(g), to_u8(b)]
}

#[inline]
fn unit_to_sample(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn sample_to_unit(v: u8) -> f32 {
    (v as f64 / 255.0) as f32
}

/// Extracts band `index` of `image` under `model`.
pub fn extract_band(image: &DynamicImage, model: ColorModel, index: usize) -> Result<Band> {
    let image = normalize(image);
    let pixel_type = PixelType::of(&image);
    if index >= pixel_type.band_count() {
        return Err(CodecError::Input(format!(
            "band {} requested from a {}-band image",
            index,
            pixel_type.band_count()
        )));
    }

    let (w, h) = (image.width() as usize, image.height() as usize);
    match (&*image, model) {
        (DynamicImage::ImageLuma8(gray), ColorModel::Rgb) => Band::from_samples(w, h, gray.as_raw().clone())
            .ok_or_else(|| CodecError::Input("luma buffer does not match its size".to_string())),
        (DynamicImage::ImageLuma8(_), ColorModel::Hsb) => Err(CodecError::Input(
            "the HSB colour model needs a three-band image".to_string(),
        )),
        (DynamicImage::ImageRgb8(rgb), model) => {
            let pixels: &[[u8; 3]] = bytemuck::cast_slice(rgb.as_raw());
            let samples: Vec<u8> = match model {
                ColorModel::Rgb => pixels.iter().map(|p| p[index]).collect(),
                ColorModel::Hsb => pixels
                    .iter()
                    .map(|p| unit_to_sample(rgb_to_hsb(p[0], p[1], p[2])[index]))
                    .collect(),
            };
            Band::from_samples(w, h, samples)
                .ok_or_else(|| CodecError::Input("rgb buffer does not match its size".to_string()))
        }
        (other, _) => Err(CodecError::Input(format!("unsupported pixel layout {:?}", other.color()))),
    }
}

/// Extracts every band of `image` under `model`, in band order.
pub fn extract_bands(image: &DynamicImage, model: ColorModel) -> Result<Vec<Band>> {
    let image = normalize(image);
    (0..PixelType::of(&image).band_count())
        .map(|index| extract_band(&image, model, index))
        .collect()
}

/// Recombines decoded bands into an image. One band yields a gray image,
/// three bands an RGB image.
pub fn combine_bands(bands: &[Band], model: ColorModel) -> Result<DynamicImage> {
    let first = bands
        .first()
        .ok_or_else(|| CodecError::Input("no bands to combine".to_string()))?;
    let (w, h) = (first.width(), first.height());
    if bands.iter().any(|b| b.width() != w || b.height() != h) {
        return Err(CodecError::Input("bands differ in size".to_string()));
    }

    match (bands.len(), model) {
        (1, ColorModel::Rgb) => {
            let gray = GrayImage::from_raw(w as u32, h as u32, first.samples().to_vec())
                .ok_or_else(|| CodecError::Input("band buffer does not match its size".to_string()))?;
            Ok(DynamicImage::ImageLuma8(gray))
        }
        (1, ColorModel::Hsb) => Err(CodecError::Input(
            "the HSB colour model needs three bands".to_string(),
        )),
        (3, model) => {
            let (b0, b1, b2) = (bands[0].samples(), bands[1].samples(), bands[2].samples());
            let mut raw = Vec::with_capacity(w * h * 3);
            for i in 0..w * h {
                let pixel = match model {
                    ColorModel::Rgb => [b0[i], b1[i], b2[i]],
                    ColorModel::Hsb => {
                        hsb_to_rgb(sample_to_unit(b0[i]), sample_to_unit(b1[i]), sample_to_unit(b2[i]))
                    }
                };
                raw.extend_from_slice(&pixel);
            }
            let rgb = RgbImage::from_raw(w as u32, h as u32, raw)
                .ok_or_else(|| CodecError::Input("band buffer does not match its size".to_string()))?;
            Ok(DynamicImage::ImageRgb8(rgb))
        }
        (n, _) => Err(CodecError::Input(format!("cannot combine {} bands", n))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::Rgb;

    #[test]
    fn test_hsb_primaries() {
        assert_eq!(rgb_to_hsb(255, 0, 0), [0.0, 1.0, 1.0]);
        let [h, s, b] = rgb_to_hsb(0, 255, 0);
        assert!((h - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!((s, b), (1.0, 1.0));
        assert_eq!(rgb_to_hsb(0, 0, 0), [0.0, 0.0, 0.0]);

        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsb_to_rgb(2.0 / 3.0, 1.0, 1.0), [0, 0, 255]);
        assert_eq!(hsb_to_rgb(0.5, 0.0, 0.5), [128, 128, 128]);
    }

    #[test]
    fn test_hsb_round_trip_is_close() {
        for &(r, g, b) in &[(12u8, 200u8, 99u8), (250, 250, 10), (0, 0, 0), (77, 77, 77), (1, 2, 3)] {
            let [h, s, v] = rgb_to_hsb(r, g, b);
            let back = hsb_to_rgb(h, s, v);
            assert_eq!(back, [r, g, b], "unquantised HSB round trip for {:?}", (r, g, b));
        }
    }

    #[test]
    fn test_rgb_bands_are_raw_channels() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        img.put_pixel(1, 0, Rgb([40, 50, 60]));
        let img = DynamicImage::ImageRgb8(img);

        let bands = extract_bands(&img, ColorModel::Rgb).unwrap();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].samples(), &[10, 40]);
        assert_eq!(bands[2].samples(), &[30, 60]);

        let back = combine_bands(&bands, ColorModel::Rgb).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_hsb_bands_scaled_to_bytes() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([0, 0, 255])));
        let bands = extract_bands(&img, ColorModel::Hsb).unwrap();
        // hue 2/3, full saturation, full brightness
        assert_eq!(bands[0].get(0, 0), 170);
        assert_eq!(bands[1].get(0, 0), 255);
        assert_eq!(bands[2].get(0, 0), 255);

        let back = combine_bands(&bands, ColorModel::Hsb).unwrap();
        assert_eq!(back.to_rgb8().get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_gray_image_rejects_hsb() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        assert!(matches!(
            extract_bands(&img, ColorModel::Hsb),
            Err(CodecError::Input(_))
        ));
        assert_eq!(extract_bands(&img, ColorModel::Rgb).unwrap().len(), 1);
        assert!(extract_band(&img, ColorModel::Rgb, 1).is_err());
    }

    #[test]
    fn test_parse_model_names() {
        assert_eq!("hsb".parse::<ColorModel>().unwrap(), ColorModel::Hsb);
        assert_eq!("RGB".parse::<ColorModel>().unwrap(), ColorModel::Rgb);
        assert!("cmyk".parse::<ColorModel>().is_err());
        assert!(ColorModel::from_name("rgb").is_err());
    }
}
