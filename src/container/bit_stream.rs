// src/container/bit_stream.rs

//! Byte streams with single-bit reads and writes.
//!
//! Bits are packed most significant first. Any byte-level write first pads
//! the pending partial byte with zero bits, and any byte-level read first
//! discards what is left of a partially consumed byte, so byte fields always
//! start on a byte boundary.

use crate::utils::error::Result;
use bitvec::prelude::*;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Writes bytes and individual bits to an underlying writer.
pub struct BitWriter<W: Write> {
    writer: W,
    pending: BitVec<u8, Msb0>,
}

impl<W: Write> BitWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pending: BitVec::with_capacity(8),
        }
    }

    /// Number of bits written into the current, not yet emitted byte.
    #[inline]
    pub fn bit_offset(&self) -> usize {
        self.pending.len()
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.pending.push(bit);
        if self.pending.len() == 8 {
            self.writer.write_all(self.pending.as_raw_slice())?;
            self.pending.clear();
        }
        Ok(())
    }

    /// Pads the pending byte with zero bits and emits it.
    pub fn align(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            self.pending.resize(8, false);
            self.writer.write_all(self.pending.as_raw_slice())?;
            self.pending.clear();
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.align()?;
        self.writer.write_u8(value)?;
        Ok(())
    }

    /// Emits any pending bits and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.align()?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reads bytes and individual bits from an underlying reader.
pub struct BitReader<R: Read> {
    reader: R,
    current: u8,
    // 8 means no partially consumed byte is buffered.
    offset: usize,
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            current: 0,
            offset: 8,
        }
    }

    /// Number of bits already consumed from the current byte, 0 when aligned.
    #[inline]
    pub fn bit_offset(&self) -> usize {
        self.offset % 8
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.offset == 8 {
            self.current = self.reader.read_u8()?;
            self.offset = 0;
        }
        let bit = self.current.view_bits::<Msb0>()[self.offset];
        self.offset += 1;
        Ok(bit)
    }

    /// Skips the rest of a partially consumed byte.
    #[inline]
    pub fn align(&mut self) {
        self.offset = 8;
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.align();
        Ok(self.reader.read_u8()?)
    }
}
