//! Resource-rewriting filters and the driver that runs them

pub mod driver;
pub mod img_filter;
pub mod img_rewrite_filter;
pub mod outline_filter;
pub mod write_resource;

pub use driver::{RewriteDriver, rewrite_html};
pub use img_filter::parse_img_element;
pub use img_rewrite_filter::ImgRewriteFilter;
pub use outline_filter::OutlineFilter;
pub use write_resource::{write_all, write_bytes_with_type};
