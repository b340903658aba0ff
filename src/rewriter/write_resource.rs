//! Publishing transformed bytes and pointing markup at them

use crate::html::{ElementId, HtmlParse};
use crate::resource::{ContentType, OutputResource, ResourceError, ResourceStore};

/// Run a fresh output resource through its whole lifecycle with `contents`
/// as the only chunk
pub fn write_all(resource: &mut dyn OutputResource, contents: &[u8]) -> Result<(), ResourceError> {
    resource.open()?;
    resource.write_chunk(contents)?;
    resource.close()
}

/// Publish `contents` as a new resource and rewrite `element`'s `attribute`
/// to its URL
///
/// The attribute changes only if every write step succeeded and the resource
/// reports itself readable. Returns whether it changed.
pub fn write_bytes_with_type(
    parse: &mut HtmlParse,
    store: &dyn ResourceStore,
    content_type: ContentType,
    contents: &[u8],
    element: ElementId,
    attribute: &str,
) -> bool {
    let mut resource = store.create_output_resource(content_type);
    if let Err(e) = write_all(resource.as_mut(), contents) {
        parse.warning_here(format!("Failed to write {content_type} resource: {e}"));
        return false;
    }
    let Some(url) = resource.url().filter(|_| resource.is_readable()) else {
        parse.warning_here(format!("Written {content_type} resource is not readable"));
        return false;
    };
    let url = url.to_string();

    let Some(attr) = parse.element_mut(element).find_attribute_mut(attribute) else {
        return false;
    };
    attr.value = url.clone();
    parse.info_here(format!("Remapped to {url}"));
    true
}
