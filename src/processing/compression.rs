//! # Frame Compression
//!
//! Whole-frame DEFLATE in a zlib container at maximum compression level.
//! Neither direction can fail from the caller's point of view: every call
//! returns a [`Packed`] value that carries either the transformed bytes or
//! the untouched input, together with a flag saying which one it is.

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use log::{debug, warn};
use std::io::Write;

/// Bytes plus a record of whether the (de)compression step was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub bytes: Vec<u8>,
    /// `true` when `bytes` is the transformed form, `false` when it is the input.
    pub transformed: bool,
}

impl Packed {
    fn transformed(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            transformed: true,
        }
    }

    fn passthrough(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            transformed: false,
        }
    }
}

/// Compress `data` at the best compression level, falling back to the raw bytes.
pub fn compress(data: &[u8]) -> Packed {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), Compression::best());

    let result = encoder.write_all(data).and_then(|_| encoder.finish());
    match result {
        Ok(bytes) => {
            debug!("Compressed frame {} -> {} bytes", data.len(), bytes.len());
            Packed::transformed(bytes)
        }
        Err(e) => {
            warn!("Compression failed, embedding raw frame: {}", e);
            Packed::passthrough(data)
        }
    }
}

/// Inflate `data`, or return it unchanged when it is not a complete zlib stream.
///
/// This covers both payloads embedded without compression and corrupted or
/// truncated data. Only a stream that reaches its end marker counts as inflated.
pub fn decompress(data: &[u8]) -> Packed {
    if data.is_empty() {
        return Packed::passthrough(data);
    }

    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len().saturating_mul(4).max(64));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }

        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let input = &data[before_in as usize..];

        match inflater.decompress_vec(input, &mut out, FlushDecompress::Finish) {
            Ok(Status::StreamEnd) => {
                debug!("Inflated {} -> {} bytes", data.len(), out.len());
                return Packed::transformed(out);
            }
            Ok(_) => {
                let stalled =
                    inflater.total_in() == before_in && inflater.total_out() == before_out;
                if stalled && out.len() < out.capacity() {
                    debug!("Truncated zlib stream, using raw bytes");
                    return Packed::passthrough(data);
                }
            }
            Err(e) => {
                debug!("Data is not a zlib stream ({}), using raw bytes", e);
                return Packed::passthrough(data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_then_decompress() {
        let data = b"TXT:the quick brown fox jumps over the lazy dog, again and again and again".to_vec();

        let packed = compress(&data);
        assert!(packed.transformed);
        assert_eq!(packed.bytes[0], 0x78, "zlib header expected");

        let unpacked = decompress(&packed.bytes);
        assert!(unpacked.transformed);
        assert_eq!(unpacked.bytes, data);
    }

    #[test]
    fn test_decompress_raw_frame_falls_back() {
        let data = b"TXT:not compressed";
        let unpacked = decompress(data);

        assert!(!unpacked.transformed);
        assert_eq!(unpacked.bytes, data.to_vec());
    }

    #[test]
    fn test_decompress_truncated_stream_falls_back() {
        let packed = compress(&vec![7u8; 4096]);
        let truncated = &packed.bytes[..packed.bytes.len() / 2];

        let unpacked = decompress(truncated);
        assert!(!unpacked.transformed);
        assert_eq!(unpacked.bytes, truncated.to_vec());
    }

    #[test]
    fn test_decompress_empty() {
        let unpacked = decompress(&[]);
        assert!(!unpacked.transformed);
        assert!(unpacked.bytes.is_empty());
    }
}
