//! Lossless PNG optimization, with GIF accepted as an input format

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageError, ImageFormat};

/// Decoder feeding the PNG optimizer
///
/// Every variant decodes into the same raster representation, so the
/// optimizer does not care where the pixels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngReader {
    Png,
    /// First frame of a GIF
    Gif,
}

impl PngReader {
    fn format(self) -> ImageFormat {
        match self {
            PngReader::Png => ImageFormat::Png,
            PngReader::Gif => ImageFormat::Gif,
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        image::load_from_memory_with_format(bytes, self.format())
    }
}

pub struct PngOptimizer;

impl PngOptimizer {
    /// Decode with `reader` and write a PNG with best compression and adaptive
    /// filtering. Ancillary chunks (text, timestamps, color profiles) are not
    /// carried over.
    ///
    /// Returns `None` on decode or encode failure, or when the result is not
    /// strictly smaller than the input.
    #[must_use]
    pub fn optimize(reader: PngReader, bytes: &[u8]) -> Option<Vec<u8>> {
        let decoded = match reader.decode(bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::debug!("{reader:?} decode failed: {e}");
                return None;
            }
        };

        let mut optimized = Vec::with_capacity(bytes.len());
        let encoder =
            PngEncoder::new_with_quality(&mut optimized, CompressionType::Best, FilterType::Adaptive);
        if let Err(e) = decoded.write_with_encoder(encoder) {
            log::debug!("PNG encode failed: {e}");
            return None;
        }

        (optimized.len() < bytes.len()).then_some(optimized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn flat_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 255])))
    }

    fn encode(image: &DynamicImage, compression: CompressionType) -> Vec<u8> {
        let mut out = Vec::new();
        image
            .write_with_encoder(PngEncoder::new_with_quality(
                &mut out,
                compression,
                FilterType::NoFilter,
            ))
            .expect("encode");
        out
    }

    /// Insert a large `tEXt` chunk right after IHDR
    fn with_text_chunk(png: &[u8], text_len: usize) -> Vec<u8> {
        const IHDR_END: usize = 8 + 4 + 4 + 13 + 4;
        let mut data = b"Comment\0".to_vec();
        data.extend(std::iter::repeat_n(b'x', text_len));
        let mut chunk = (data.len() as u32).to_be_bytes().to_vec();
        let mut typed = b"tEXt".to_vec();
        typed.extend_from_slice(&data);
        chunk.extend_from_slice(&typed);
        chunk.extend_from_slice(&crc32fast::hash(&typed).to_be_bytes());

        let mut out = png[..IHDR_END].to_vec();
        out.extend_from_slice(&chunk);
        out.extend_from_slice(&png[IHDR_END..]);
        out
    }

    #[test]
    fn ancillary_chunks_are_dropped() {
        let input = with_text_chunk(&encode(&flat_image(), CompressionType::Fast), 4096);
        assert!(PngReader::Png.decode(&input).is_ok());
        let output = PngOptimizer::optimize(PngReader::Png, &input).expect("smaller");
        assert!(output.len() < input.len());
        assert!(!output.windows(4).any(|window| window == b"tEXt"));
        assert_eq!(image::guess_format(&output).ok(), Some(ImageFormat::Png));
    }

    #[test]
    fn gif_bytes_are_not_a_png() {
        assert!(PngOptimizer::optimize(PngReader::Png, b"GIF89a\x01\x00\x01\x00").is_none());
    }
}
