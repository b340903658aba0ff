//! Content types of published resources and image classification of fetched ones

use serde::{Deserialize, Serialize};

/// Kind of bytes an output resource holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Css,
    Javascript,
    Jpeg,
    Png,
    Gif,
}

impl ContentType {
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            ContentType::Css => "text/css",
            ContentType::Javascript => "text/javascript",
            ContentType::Jpeg => "image/jpeg",
            ContentType::Png => "image/png",
            ContentType::Gif => "image/gif",
        }
    }

    /// Extension of published file names, without the dot
    #[must_use]
    pub fn file_extension(self) -> &'static str {
        match self {
            ContentType::Css => "css",
            ContentType::Javascript => "js",
            ContentType::Jpeg => "jpg",
            ContentType::Png => "png",
            ContentType::Gif => "gif",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Image classification of fetched bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
    Unknown,
}

impl ImageType {
    /// Classify by magic bytes; headers are not trusted
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => ImageType::Jpeg,
            Ok(image::ImageFormat::Png) => ImageType::Png,
            Ok(image::ImageFormat::Gif) => ImageType::Gif,
            _ => ImageType::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(ImageType::sniff(b"\xFF\xD8\xFF\xE0rest"), ImageType::Jpeg);
        assert_eq!(ImageType::sniff(b"\x89PNG\r\n\x1a\nrest"), ImageType::Png);
        assert_eq!(ImageType::sniff(b"GIF89a...."), ImageType::Gif);
        assert_eq!(ImageType::sniff(b"<svg></svg>"), ImageType::Unknown);
        assert_eq!(ImageType::sniff(b""), ImageType::Unknown);
    }

    #[test]
    fn extensions_match_mime_types() {
        assert_eq!(ContentType::Css.file_extension(), "css");
        assert_eq!(ContentType::Javascript.mime_type(), "text/javascript");
        assert_eq!(ContentType::Jpeg.to_string(), "image/jpeg");
    }
}
