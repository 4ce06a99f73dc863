use band_codecs::encode::{cac, dct, delta, rle};
use band_codecs::image::color::{combine_bands, extract_bands};
use band_codecs::{
    CacParams, Codec, CodecError, CodecKind, ColorModel, ContainerHeader, DctParams, DeltaParams,
    PixelType, RleParams, decode, decode_from_slice,
};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::{BufReader, Cursor};

fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            ((x * 7 + y * 13) % 256) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

fn noisy_gray(width: u32, height: u32) -> DynamicImage {
    // cheap deterministic noise
    let img = GrayImage::from_fn(width, height, |x, y| {
        let v = x.wrapping_mul(2654435761).wrapping_add(y.wrapping_mul(40503)) >> 7;
        Luma([(v % 256) as u8])
    });
    DynamicImage::ImageLuma8(img)
}

fn all_codecs() -> Vec<Codec> {
    vec![
        Codec::Cac(CacParams::default()),
        Codec::Cac(CacParams { color_model: ColorModel::Hsb, tolerances: [2.0, 8.0, 3.0] }),
        Codec::Dct(DctParams::default()),
        Codec::Dct(DctParams { coefficients: 1 }),
        Codec::Delta(DeltaParams::default()),
        Codec::Delta(DeltaParams { color_model: ColorModel::Hsb, steps: [1.5, 3.0, 6.0] }),
        Codec::Rle(RleParams::default()),
        Codec::Rle(RleParams { color_model: ColorModel::Hsb }),
    ]
}

fn total_abs_error(a: &GrayImage, b: &GrayImage) -> u64 {
    a.pixels()
        .zip(b.pixels())
        .map(|(p, q)| (p.0[0] as i64 - q.0[0] as i64).unsigned_abs())
        .sum()
}

/// Every codec keeps the image dimensions, including odd and tiny sizes
#[test]
fn test_dimensions_survive_every_codec() {
    for (w, h) in [(1, 1), (1, 9), (8, 8), (13, 7), (33, 20)] {
        let img = gradient_rgb(w, h);
        for codec in all_codecs() {
            let bytes = codec.encode_to_vec(&img).expect("encoding failed");
            let back = decode_from_slice(&bytes).expect("decoding failed");
            assert_eq!(
                (back.width(), back.height()),
                (w, h),
                "{} changed the dimensions",
                codec.kind()
            );
        }
    }
}

#[test]
fn test_rle_is_lossless_for_rgb_and_gray() {
    for img in [gradient_rgb(37, 21), noisy_gray(300, 4)] {
        let mut out = Vec::new();
        rle::encode(&img, &RleParams::default(), &mut out).unwrap();
        let back = rle::decode(Cursor::new(&out)).unwrap();
        assert_eq!(back, img);
    }
}

#[test]
fn test_rle_hsb_matches_band_round_trip() {
    // only the HSB quantisation itself may change samples
    let img = gradient_rgb(19, 11);
    let reference = combine_bands(&extract_bands(&img, ColorModel::Hsb).unwrap(), ColorModel::Hsb).unwrap();

    let params = RleParams { color_model: ColorModel::Hsb };
    let mut out = Vec::new();
    rle::encode(&img, &params, &mut out).unwrap();
    let back = rle::decode(Cursor::new(&out)).unwrap();
    assert_eq!(back, reference);
}

#[test]
fn test_dct_fidelity_grows_with_coefficients() {
    let img = noisy_gray(21, 14);
    let original = img.to_luma8();

    let decode_with = |n: usize| {
        let mut out = Vec::new();
        dct::encode(&img, &DctParams { coefficients: n }, &mut out).unwrap();
        dct::decode(Cursor::new(&out)).unwrap().to_luma8()
    };

    let coarse = total_abs_error(&original, &decode_with(1));
    let medium = total_abs_error(&original, &decode_with(20));
    let full = decode_with(64);
    assert!(coarse >= medium, "N=1 error {} below N=20 error {}", coarse, medium);
    assert!(medium >= total_abs_error(&original, &full));
    for (a, b) in original.pixels().zip(full.pixels()) {
        assert!((a.0[0] as i32 - b.0[0] as i32).abs() <= 1);
    }
}

#[test]
fn test_dct_single_uniform_tile() {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([128])));
    let mut out = Vec::new();
    dct::encode(&img, &DctParams { coefficients: 1 }, &mut out).unwrap();
    let back = dct::decode(Cursor::new(&out)).unwrap().to_luma8();
    assert!(back.pixels().all(|p| (p.0[0] as i32 - 128).abs() <= 2));
}

#[test]
fn test_cac_flat_image_is_one_byte() {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([200])));
    let params = CacParams { tolerances: [5.0; 3], ..Default::default() };
    let mut out = Vec::new();
    cac::encode(&img, &params, &mut out).unwrap();

    // utf "CAC", u16 16, u16 16, i32 10, utf "RGB", one leaf
    let mut expected = vec![0, 3, b'C', b'A', b'C', 0, 16, 0, 16, 0, 0, 0, 10, 0, 3, b'R', b'G', b'B'];
    expected.push(200);
    assert_eq!(out, expected);

    let negative = CacParams { tolerances: [-1.0; 3], ..Default::default() };
    let err = cac::encode(&img, &negative, Vec::new()).unwrap_err();
    assert!(matches!(err, CodecError::Input(_)), "unexpected error {:?}", err);
}

#[test]
fn test_cac_zero_tolerance_on_flat_regions() {
    let img = RgbImage::from_fn(12, 12, |x, _| if x < 6 { Rgb([40, 90, 0]) } else { Rgb([220, 10, 0]) });
    let img = DynamicImage::ImageRgb8(img);
    let params = CacParams { tolerances: [0.0; 3], ..Default::default() };
    let mut out = Vec::new();
    cac::encode(&img, &params, &mut out).unwrap();
    let back = cac::decode(Cursor::new(&out)).unwrap().to_rgb8();
    for (x, _, p) in back.enumerate_pixels() {
        // the blue band is a flat 0 and comes back as 1
        let expected = if x < 6 { [40, 90, 1] } else { [220, 10, 1] };
        assert_eq!(p.0, expected);
    }
}

#[test]
fn test_delta_tracks_monotonic_rows() {
    let step = 3.0;
    let exact = DynamicImage::ImageLuma8(GrayImage::from_fn(50, 2, |x, _| Luma([(10 + x * 3) as u8])));
    let slow = DynamicImage::ImageLuma8(GrayImage::from_fn(50, 2, |x, _| Luma([(10 + x * 2) as u8])));
    let params = DeltaParams { steps: [step; 3], ..Default::default() };

    let mut out = Vec::new();
    delta::encode(&exact, &params, &mut out).unwrap();
    let back = delta::decode(Cursor::new(&out)).unwrap();
    assert_eq!(back, exact);

    let mut out = Vec::new();
    delta::encode(&slow, &params, &mut out).unwrap();
    let back = delta::decode(Cursor::new(&out)).unwrap().to_luma8();
    for (a, b) in slow.to_luma8().pixels().zip(back.pixels()) {
        assert!((a.0[0] as f64 - b.0[0] as f64).abs() <= step);
    }
}

#[test]
fn test_decoders_reject_foreign_streams() {
    let img = gradient_rgb(5, 5);
    let rle_stream = Codec::Rle(RleParams::default()).encode_to_vec(&img).unwrap();

    let err = cac::decode(Cursor::new(&rle_stream)).unwrap_err();
    match err {
        CodecError::MagicMismatch { expected, ref found } => {
            assert_eq!(expected, "CAC");
            assert_eq!(found, "RLE");
        }
        other => panic!("expected a magic mismatch, got {:?}", other),
    }
    assert!(dct::decode(Cursor::new(&rle_stream)).unwrap_err().is_format_error());
    assert!(delta::decode(Cursor::new(&rle_stream)).unwrap_err().is_format_error());

    assert!(decode_from_slice(b"\x00\x04JPEG\x00\x01").unwrap_err().is_format_error());
}

#[test]
fn test_truncated_streams_are_format_errors() {
    let img = gradient_rgb(9, 9);
    for codec in all_codecs() {
        let bytes = codec.encode_to_vec(&img).unwrap();
        for cut in [3, 10, bytes.len() - 1] {
            let err = decode_from_slice(&bytes[..cut]).unwrap_err();
            assert!(err.is_format_error(), "{} cut at {}: {:?}", codec.kind(), cut, err);
        }
    }
}

/// Offset of the colour model name bytes, after the header and the u16 length
fn model_offset(kind: CodecKind) -> usize {
    2 + kind.magic().len() + 8 + 2
}

fn gray_streams() -> Vec<(CodecKind, Vec<u8>)> {
    let img = noisy_gray(6, 5);
    [
        Codec::Cac(CacParams::default()),
        Codec::Delta(DeltaParams::default()),
        Codec::Rle(RleParams::default()),
    ]
    .iter()
    .map(|codec| (codec.kind(), codec.encode_to_vec(&img).expect("encoding failed")))
    .collect()
}

#[test]
fn test_gray_stream_claiming_hsb_is_format_error() {
    for (kind, mut bytes) in gray_streams() {
        let at = model_offset(kind);
        assert_eq!(&bytes[at..at + 3], b"RGB");
        bytes[at..at + 3].copy_from_slice(b"HSB");
        let err = decode_from_slice(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Format(_)), "{}: {:?}", kind, err);
    }
}

#[test]
fn test_unknown_colour_model_is_format_error() {
    for (kind, mut bytes) in gray_streams() {
        let at = model_offset(kind);
        bytes[at..at + 3].copy_from_slice(b"CMY");
        let err = decode_from_slice(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Format(_)), "{}: {:?}", kind, err);
    }
}

#[test]
fn test_huge_declared_size_with_no_payload() {
    // a short stream claiming a 65535x65535 RGB image ends before any band is complete
    for kind in CodecKind::ALL {
        let header = ContainerHeader {
            kind,
            width: u16::MAX,
            height: u16::MAX,
            pixel_type: PixelType::Rgb,
        };
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        match kind {
            CodecKind::Dct => bytes.extend_from_slice(&1i32.to_be_bytes()),
            CodecKind::Delta => {
                bytes.extend_from_slice(&[0, 3, b'R', b'G', b'B']);
                for _ in 0..3 {
                    bytes.extend_from_slice(&4f64.to_be_bytes());
                }
            }
            CodecKind::Cac | CodecKind::Rle => bytes.extend_from_slice(&[0, 3, b'R', b'G', b'B']),
        }
        // the quadtree needs its root byte before a band exists; the others get a few stray bytes
        if kind != CodecKind::Cac {
            bytes.extend_from_slice(&[0, 7, 1]);
        }

        let err = decode_from_slice(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Truncated), "{}: {:?}", kind, err);
    }
}

#[test]
fn test_hsb_rejects_gray_images() {
    let img = noisy_gray(4, 4);
    let params = DeltaParams { color_model: ColorModel::Hsb, ..Default::default() };
    let err = delta::encode(&img, &params, Vec::new()).unwrap_err();
    assert!(matches!(err, CodecError::Input(_)));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let img = gradient_rgb(24, 17);

    for codec in [Codec::Rle(RleParams::default()), Codec::Dct(DctParams { coefficients: 64 })] {
        let path = dir.path().join(format!("image.{}", codec.kind()));
        let mut file = File::create(&path).expect("Failed to create output file");
        codec.encode(&img, &mut file).unwrap();
        drop(file);

        let data = fs::read(&path).unwrap();
        assert_eq!(CodecKind::sniff(&data), Some(codec.kind()));

        let reader = BufReader::new(File::open(&path).unwrap());
        let back = decode(reader).unwrap();
        assert_eq!((back.width(), back.height()), (24, 17));
        println!("{} wrote {} bytes to {}", codec.kind(), data.len(), path.display());
    }
}
