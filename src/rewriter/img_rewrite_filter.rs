//! Recompresses referenced images and points `src` at the smaller copy

use std::sync::Arc;

use super::img_filter::parse_img_element;
use super::write_resource::write_bytes_with_type;
use crate::html::{ElementId, HtmlFilter, HtmlParse};
use crate::image_compression::{PngOptimizer, PngReader, optimize_jpeg};
use crate::resource::{ContentType, ImageType, InputResource, ResourceStore};
use crate::utils::resolve_url;

pub struct ImgRewriteFilter {
    store: Arc<dyn ResourceStore>,
    jpeg_quality: u8,
    enable_gif: bool,
}

impl ImgRewriteFilter {
    pub fn new(store: Arc<dyn ResourceStore>, jpeg_quality: u8, enable_gif: bool) -> Self {
        Self {
            store,
            jpeg_quality,
            enable_gif,
        }
    }

    fn optimize(&self, parse: &mut HtmlParse, element: ElementId, image: &dyn InputResource) {
        let (optimized, content_type) = match image.image_type() {
            ImageType::Jpeg => (optimize_jpeg(image.contents(), self.jpeg_quality), ContentType::Jpeg),
            ImageType::Png => (
                PngOptimizer::optimize(PngReader::Png, image.contents()),
                ContentType::Png,
            ),
            ImageType::Gif if self.enable_gif => (
                PngOptimizer::optimize(PngReader::Gif, image.contents()),
                ContentType::Png,
            ),
            ImageType::Gif => {
                log::debug!("GIF rewriting disabled, leaving {}", image.url());
                return;
            }
            ImageType::Unknown => {
                parse.info_here(format!("{}: Can't recognize image format", image.url()));
                return;
            }
        };

        match optimized {
            Some(bytes) => {
                write_bytes_with_type(parse, self.store.as_ref(), content_type, &bytes, element, "src");
            }
            None => log::debug!("{} not improved by recompression", image.url()),
        }
    }
}

impl HtmlFilter for ImgRewriteFilter {
    fn name(&self) -> &'static str {
        "ImgRewriteFilter"
    }

    fn end_element(&mut self, parse: &mut HtmlParse, element: ElementId) {
        let Some(src) = parse_img_element(parse, element) else {
            return;
        };
        let tag = parse.element_to_string(element);
        parse.info_here(format!("Found image: {tag}"));

        let url = match resolve_url(parse.url(), &src) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("Using unresolved image URL {src}: {e:#}");
                src.clone()
            }
        };

        let Some(mut image) = self.store.create_input_resource(&url) else {
            parse.warning_here(format!("{src}: Img contents weren't loaded"));
            return;
        };
        if let Err(e) = image.read() {
            log::debug!("Reading {url} failed: {e}");
            parse.warning_here(format!("{src}: Img contents weren't loaded"));
            return;
        }
        if !image.contents_valid() {
            parse.warning_here(format!("{url}: Img contents are invalid."));
            return;
        }

        self.optimize(parse, element, image.as_ref());
    }
}
