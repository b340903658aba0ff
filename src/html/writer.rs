//! Serialization of the event window back to markup

use super::element::{CloseStyle, ElementId, HtmlElement, QuoteStyle, is_raw_text_tag};
use super::event::HtmlEvent;

/// Write `<tag attr="value" ...>` (or `.../>` for brief-closed elements)
pub(crate) fn write_start_tag(out: &mut String, element: &HtmlElement) {
    out.push('<');
    out.push_str(element.tag());
    for attr in element.attributes() {
        out.push(' ');
        out.push_str(&attr.name);
        if attr.value.is_empty() && attr.quote == QuoteStyle::None {
            continue;
        }
        out.push('=');
        out.push_str(attr.quote.as_str());
        match attr.quote {
            QuoteStyle::Double => {
                out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
            }
            QuoteStyle::Single => {
                out.push_str(&html_escape::encode_single_quoted_attribute(&attr.value));
            }
            QuoteStyle::None => {
                out.push_str(&html_escape::encode_unquoted_attribute(&attr.value));
            }
        }
        out.push_str(attr.quote.as_str());
    }
    if element.close_style() == CloseStyle::Brief {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}

/// Serializer state that must survive across flush windows
#[derive(Debug, Default)]
pub(crate) struct HtmlWriter {
    /// Raw-text element whose content is being written, if any
    raw_text: Option<ElementId>,
}

impl HtmlWriter {
    pub(crate) fn write_event(&mut self, out: &mut String, event: &HtmlEvent, elements: &[HtmlElement]) {
        match event {
            HtmlEvent::StartDocument | HtmlEvent::EndDocument => {}
            HtmlEvent::StartElement(id) => {
                let element = &elements[id.0];
                write_start_tag(out, element);
                if is_raw_text_tag(element.tag()) && element.close_style() != CloseStyle::Brief {
                    self.raw_text = Some(*id);
                }
            }
            HtmlEvent::EndElement(id) => {
                if self.raw_text == Some(*id) {
                    self.raw_text = None;
                }
                let element = &elements[id.0];
                if element.close_style() == CloseStyle::Explicit {
                    out.push_str("</");
                    out.push_str(element.tag());
                    out.push('>');
                }
            }
            HtmlEvent::StrayEndTag(tag) => {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            HtmlEvent::Characters(text) | HtmlEvent::IgnorableWhitespace(text) => {
                if self.raw_text.is_some() {
                    out.push_str(text);
                } else {
                    out.push_str(&html_escape::encode_text(text));
                }
            }
            HtmlEvent::Comment(text) | HtmlEvent::IeDirective(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            HtmlEvent::Cdata(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            HtmlEvent::Directive(text) => {
                out.push_str("<!");
                out.push_str(text);
                out.push('>');
            }
        }
    }
}
