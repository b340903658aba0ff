//! Recognizing image references

use crate::html::{ElementId, HtmlParse};

/// The `src` of an `<img>` element, `None` for anything else
#[must_use]
pub fn parse_img_element(parse: &HtmlParse, element: ElementId) -> Option<String> {
    let element = parse.element(element);
    if element.tag() != "img" {
        return None;
    }
    element
        .find_attribute("src")
        .map(|src| src.value.trim().to_string())
        .filter(|src| !src.is_empty())
}
