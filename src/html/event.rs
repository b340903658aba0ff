//! Document events delivered to filters

use super::element::ElementId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlEvent {
    StartDocument,
    EndDocument,
    StartElement(ElementId),
    EndElement(ElementId),
    Characters(String),
    IgnorableWhitespace(String),
    Comment(String),
    /// `<![CDATA[...]]>` block, contents only
    Cdata(String),
    /// IE conditional comment such as `[if IE]>...<![endif]`
    IeDirective(String),
    /// `<!DOCTYPE ...>` and similar, without the `<!` `>` delimiters
    Directive(String),
    /// End tag with no matching open element, written back as `</name>`
    StrayEndTag(String),
}

#[derive(Debug, Clone)]
pub(crate) struct QueuedEvent {
    pub(crate) event: HtmlEvent,
    pub(crate) line: u64,
}
