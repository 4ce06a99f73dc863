//! # Band Codecs
//!
//! Four raster image codecs sharing one container format. Each codec splits
//! an image into single-channel bands and stores them with its own scheme:
//!
//! - `cac`: quadtree of homogeneous regions (lossy, tolerance driven)
//! - `dct`: 8x8 block DCT keeping the first N zig-zag coefficients (lossy)
//! - `delta`: one absolute sample per row plus one-bit steps (lossy)
//! - `rle`: run lengths over the eight bit planes (lossless)
//!
//! The library is organized into several modules:
//! - `utils`: error handling
//! - `image`: bands, colour models and pixel layouts
//! - `container`: the common header and bit-level stream I/O
//! - `encode`: the codecs and the magic-tag dispatch between them
//! - `filters`: image-to-image transforms built on the same DCT

// Re-export commonly used types at the crate root
pub use utils::error::{CodecError, Result};

pub mod utils {
    pub mod error;
}

pub mod image {
    pub mod band;
    pub mod color;
    pub mod pixel;
}

pub mod container {
    pub mod bit_stream;
    pub mod header;
}

pub mod encode;

pub mod filters;

// Public API exports
pub use container::header::ContainerHeader;
pub use encode::{
    CacParams, Codec, CodecKind, DctParams, DeltaParams, RleParams, decode, decode_from_slice,
    encode_batch,
};
pub use filters::{DctEdgeFilter, DctEdgeParams, ImageFilter};
pub use self::image::band::Band;
pub use self::image::color::ColorModel;
pub use self::image::pixel::PixelType;
