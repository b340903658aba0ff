//! Moves inline `<style>` and `<script>` contents into published resources
//!
//! ```text
//! <style>b { color: red }</style>
//!   => <link rel="stylesheet" href="http://cdn/0f3a....css">
//! <script>go()</script>
//!   => <script src="http://cdn/91c2....js"></script>
//! ```
//!
//! Anything the filter does not fully understand (markup, comments or CDATA
//! inside the block, a block split by a flush, a non-default `type`) is left
//! exactly as written.

use std::sync::Arc;

use super::write_resource::write_all;
use crate::html::{ElementId, HtmlFilter, HtmlParse, QuoteStyle};
use crate::resource::{ContentType, ResourceStore};
use crate::utils::{TEXT_CSS, TEXT_JAVASCRIPT};

#[derive(Debug)]
enum OutlineState {
    Idle,
    Buffering { element: ElementId, text: String },
}

pub struct OutlineFilter {
    store: Arc<dyn ResourceStore>,
    outline_styles: bool,
    outline_scripts: bool,
    state: OutlineState,
}

impl OutlineFilter {
    pub fn new(store: Arc<dyn ResourceStore>, outline_styles: bool, outline_scripts: bool) -> Self {
        Self {
            store,
            outline_styles,
            outline_scripts,
            state: OutlineState::Idle,
        }
    }

    /// Abandon the current block because of unexpected content
    fn structural_error(&mut self, parse: &mut HtmlParse, message: String) {
        if matches!(self.state, OutlineState::Buffering { .. }) {
            parse.error_here(message);
            self.state = OutlineState::Idle;
        }
    }

    fn append(&mut self, content: &str) {
        if let OutlineState::Buffering { text, .. } = &mut self.state {
            text.push_str(content);
        }
    }

    fn outline(&self, parse: &mut HtmlParse, element: ElementId, content: &str) {
        if !parse.is_rewritable(element) {
            return;
        }

        let is_style = parse.element(element).tag() == "style";
        let (expected_type, content_type, kind) = if is_style {
            (TEXT_CSS, ContentType::Css, "style")
        } else {
            (TEXT_JAVASCRIPT, ContentType::Javascript, "script")
        };

        // Absent type means the default for the tag
        if let Some(declared) = parse.find_attribute(element, "type")
            && !declared.value.trim().eq_ignore_ascii_case(expected_type)
        {
            let description = if is_style {
                "non-css stylesheet"
            } else {
                "non-javascript script"
            };
            let tag = parse.element_to_string(element);
            parse.info_here(format!("Cannot outline {description} {tag}"));
            return;
        }

        let mut resource = self.store.create_output_resource(content_type);
        let written = write_all(resource.as_mut(), content.as_bytes());
        let url = match (&written, resource.url()) {
            (Ok(()), Some(url)) if resource.is_readable() => url.to_string(),
            _ => {
                if let Err(e) = &written {
                    log::debug!("Outlining {kind} failed: {e}");
                }
                parse.error_here(format!("Failed to write {kind} resource."));
                return;
            }
        };

        let replacement = if is_style {
            let link = parse.new_element("link");
            parse.add_attribute(link, "rel", "stylesheet", QuoteStyle::Double);
            parse.add_attribute(link, "href", url, QuoteStyle::Double);
            link
        } else {
            let script = parse.new_element("script");
            parse.add_attribute(script, "src", url, QuoteStyle::Double);
            script
        };
        let original_attributes = parse.element(element).attributes().to_vec();
        for attr in original_attributes {
            parse.add_attribute(replacement, attr.name, attr.value, attr.quote);
        }

        if parse.insert_element_before_element(element, replacement) && parse.delete_element(element) {
            log::debug!("Outlined {kind} in {}", parse.url());
        } else {
            parse.error_here(format!("Failed to replace {kind} element."));
        }
    }
}

impl HtmlFilter for OutlineFilter {
    fn name(&self) -> &'static str {
        "OutlineFilter"
    }

    fn start_document(&mut self, _parse: &mut HtmlParse) {
        self.state = OutlineState::Idle;
    }

    fn start_element(&mut self, parse: &mut HtmlParse, element: ElementId) {
        // No tags allowed inside style or script
        let tag = parse.element(element).tag().to_string();
        self.structural_error(parse, format!("Tag '{tag}' found inside style/script."));

        let outline = match tag.as_str() {
            "style" => self.outline_styles,
            // Scripts that already load from elsewhere stay as they are
            "script" => self.outline_scripts && parse.find_attribute(element, "src").is_none(),
            _ => false,
        };
        if outline {
            self.state = OutlineState::Buffering {
                element,
                text: String::new(),
            };
        }
    }

    fn end_element(&mut self, parse: &mut HtmlParse, element: ElementId) {
        match std::mem::replace(&mut self.state, OutlineState::Idle) {
            OutlineState::Idle => {}
            OutlineState::Buffering {
                element: buffered,
                text,
            } => {
                if buffered == element {
                    self.outline(parse, element, &text);
                } else {
                    let tag = parse.element(element).tag().to_string();
                    parse.error_here(format!("Tag '{tag}' found inside style/script."));
                }
            }
        }
    }

    fn characters(&mut self, _parse: &mut HtmlParse, text: &str) {
        self.append(text);
    }

    fn ignorable_whitespace(&mut self, _parse: &mut HtmlParse, whitespace: &str) {
        self.append(whitespace);
    }

    fn comment(&mut self, parse: &mut HtmlParse, _comment: &str) {
        self.structural_error(parse, "Comment found inside style/script.".to_string());
    }

    fn cdata(&mut self, parse: &mut HtmlParse, _cdata: &str) {
        self.structural_error(parse, "CDATA found inside style/script.".to_string());
    }

    fn ie_directive(&mut self, parse: &mut HtmlParse, _directive: &str) {
        self.structural_error(parse, "IE Directive found inside style/script.".to_string());
    }

    fn flush(&mut self, _parse: &mut HtmlParse) {
        // A block split by a flush cannot be outlined
        self.state = OutlineState::Idle;
    }
}
