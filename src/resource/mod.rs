//! Input and output resources and the store that creates them

pub mod content_type;
pub mod errors;
pub mod input;
pub mod manager;
pub mod output;

pub use content_type::{ContentType, ImageType};
pub use errors::ResourceError;
pub use input::{InputResource, UrlInputResource};
pub use manager::{ResourceManager, ResourceStore};
pub use output::{FileOutputResource, OutputResource};
