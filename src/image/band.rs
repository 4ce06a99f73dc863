// src/image/band.rs

//! Single-channel sample grids.

/// One band of an image: a `width` x `height` grid of 8-bit samples stored
/// row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl Band {
    /// Creates a band with every sample set to zero.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            samples: vec![0; width * height],
        }
    }

    /// Creates a band with no rows yet; decoders add rows with [`Band::grow`]
    /// as the stream delivers them.
    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            height: 0,
            samples: Vec::new(),
        }
    }

    /// Appends `rows` zeroed rows at the bottom.
    pub fn grow(&mut self, rows: usize) {
        self.height += rows;
        self.samples.resize(self.width * self.height, 0);
    }

    /// Wraps an existing row-major buffer. Returns `None` if the buffer length
    /// does not match the dimensions.
    pub fn from_samples(width: usize, height: usize, samples: Vec<u8>) -> Option<Self> {
        if samples.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            samples,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.samples[y * self.width + x] = value;
    }

    /// Reads a sample, treating anything outside the band as zero.
    #[inline]
    pub fn get_or_zero(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.get(x, y)
        } else {
            0
        }
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width;
        &self.samples[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.width;
        &mut self.samples[start..start + self.width]
    }

    /// Sets every sample of the `w` x `h` rectangle at (`x`, `y`) to `value`.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, value: u8) {
        for row in y..y + h {
            self.row_mut(row)[x..x + w].fill(value);
        }
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}
