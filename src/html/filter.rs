//! The visitor interface implemented by every rewrite filter

use super::element::ElementId;
use super::parse::HtmlParse;

/// A stateful visitor over one document traversal
///
/// The driver calls these in event order, once per event, for each flush
/// window. Every method defaults to a no-op so filters only implement what
/// they react to. Element handles must not be kept across `flush`.
pub trait HtmlFilter {
    fn name(&self) -> &'static str;

    fn start_document(&mut self, _parse: &mut HtmlParse) {}

    fn end_document(&mut self, _parse: &mut HtmlParse) {}

    fn start_element(&mut self, _parse: &mut HtmlParse, _element: ElementId) {}

    fn end_element(&mut self, _parse: &mut HtmlParse, _element: ElementId) {}

    fn characters(&mut self, _parse: &mut HtmlParse, _text: &str) {}

    fn ignorable_whitespace(&mut self, _parse: &mut HtmlParse, _whitespace: &str) {}

    fn comment(&mut self, _parse: &mut HtmlParse, _comment: &str) {}

    fn cdata(&mut self, _parse: &mut HtmlParse, _cdata: &str) {}

    fn ie_directive(&mut self, _parse: &mut HtmlParse, _directive: &str) {}

    fn directive(&mut self, _parse: &mut HtmlParse, _directive: &str) {}

    fn flush(&mut self, _parse: &mut HtmlParse) {}
}
