//! JPEG recompression

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat};

/// Re-encode a JPEG at `quality`
///
/// Returns `None` if the bytes do not decode as JPEG, if encoding fails, or if
/// the result is not strictly smaller than the input. Metadata segments (EXIF,
/// comments, thumbnails) are not carried over.
#[must_use]
pub fn optimize_jpeg(bytes: &[u8], quality: u8) -> Option<Vec<u8>> {
    let decoded = match image::load_from_memory_with_format(bytes, ImageFormat::Jpeg) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("JPEG decode failed: {e}");
            return None;
        }
    };

    // Baseline JPEG has no alpha; keep grayscale images single-channel
    let raster = match decoded.color() {
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            DynamicImage::ImageLuma8(decoded.to_luma8())
        }
        _ => DynamicImage::ImageRgb8(decoded.to_rgb8()),
    };

    let mut optimized = Vec::with_capacity(bytes.len());
    let encoder = JpegEncoder::new_with_quality(&mut optimized, quality.clamp(1, 100));
    if let Err(e) = raster.write_with_encoder(encoder) {
        log::debug!("JPEG encode failed: {e}");
        return None;
    }

    if optimized.len() < bytes.len() {
        Some(optimized)
    } else {
        log::debug!(
            "Recompressed JPEG is not smaller ({} >= {} bytes)",
            optimized.len(),
            bytes.len()
        );
        None
    }
}
