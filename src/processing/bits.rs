//! # Bit Stream Helpers
//!
//! Bytes travel through the image as a most-significant-bit-first stream.
//! [`BitReader`] hands that stream out in groups of `n` bits (one group per
//! color channel) and [`BitPacker`] folds extracted groups back into bytes.
//!
//! ## Final group padding
//! When the bit count is not a multiple of the group size, the last group is
//! padded with zero bits on the low side. The packer applies the mirror rule:
//! a trailing partial byte is completed with zero bits. Both rules only touch
//! bits that lie after the termination marker, so they never change the
//! recovered payload.

/// Reads a byte slice as groups of bits, MSB first.
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute bit position in `data`
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Total number of bits in the stream.
    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    pub fn remaining_bits(&self) -> usize {
        self.total_bits() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Take the next `width` bits (1..=8) as the low bits of a `u8`.
    ///
    /// Returns `None` once the stream is exhausted. A final group shorter than
    /// `width` is shifted up and zero padded.
    pub fn next_group(&mut self, width: u8) -> Option<u8> {
        debug_assert!((1..=8).contains(&width));

        if self.is_exhausted() {
            return None;
        }

        let mut group = 0u8;
        for _ in 0..width {
            group <<= 1;
            if self.position < self.total_bits() {
                let byte = self.data[self.position / 8];
                let bit = (byte >> (7 - self.position % 8)) & 1;
                group |= bit;
                self.position += 1;
            }
        }

        Some(group)
    }
}

/// Accumulates bit groups into whole bytes, MSB first.
#[derive(Debug, Default)]
pub struct BitPacker {
    bytes: Vec<u8>,
    acc: u16,
    acc_bits: u8,
}

impl BitPacker {
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            acc: 0,
            acc_bits: 0,
        }
    }

    /// Append the low `width` bits of `group`.
    pub fn push_group(&mut self, group: u8, width: u8) {
        debug_assert!((1..=8).contains(&width));

        let mask = ((1u16 << width) - 1) as u8;
        self.acc = (self.acc << width) | u16::from(group & mask);
        self.acc_bits += width;

        if self.acc_bits >= 8 {
            self.acc_bits -= 8;
            self.bytes.push((self.acc >> self.acc_bits) as u8);
            self.acc &= (1u16 << self.acc_bits) - 1;
        }
    }

    /// Whole bytes assembled so far (pending partial byte excluded).
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Flush, zero padding a trailing partial byte.
    pub fn finish(mut self) -> Vec<u8> {
        if self.acc_bits > 0 {
            let shift = 8 - self.acc_bits;
            self.bytes.push((self.acc << shift) as u8);
        }
        self.bytes
    }
}
