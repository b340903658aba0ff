//! Element and attribute types shared by the event source and filters

use serde::{Deserialize, Serialize};

/// Handle to an element in a document's element arena
///
/// Identity matters: two handles are equal only if they refer to the same
/// element, regardless of tag or attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

/// How an attribute value was quoted in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuoteStyle {
    #[default]
    Double,
    Single,
    /// Bare attribute (`async`) or unquoted value
    None,
}

impl QuoteStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStyle::Double => "\"",
            QuoteStyle::Single => "'",
            QuoteStyle::None => "",
        }
    }
}

/// How an element was terminated in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStyle {
    /// `</tag>` present
    Explicit,
    /// `<tag/>`
    Brief,
    /// Void element, never has an end tag
    Implicit,
    /// Closed by an ancestor's end tag or end of document
    Unclosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub quote: QuoteStyle,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>, quote: QuoteStyle) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            quote,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HtmlElement {
    pub(crate) tag: String,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) begin_line: u64,
    pub(crate) close_style: CloseStyle,
}

impl HtmlElement {
    pub(crate) fn new(tag: &str, begin_line: u64) -> Self {
        let tag = tag.to_ascii_lowercase();
        let close_style = if is_void_tag(&tag) {
            CloseStyle::Implicit
        } else {
            CloseStyle::Explicit
        };
        Self {
            tag,
            attributes: Vec::new(),
            begin_line,
            close_style,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn begin_line(&self) -> u64 {
        self.begin_line
    }

    #[must_use]
    pub fn close_style(&self) -> CloseStyle {
        self.close_style
    }

    /// First attribute with the given (case-insensitive) name
    #[must_use]
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn find_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes
            .iter_mut()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Render the start tag, e.g. `<img src="a.jpg">`
    #[must_use]
    pub fn start_tag_string(&self) -> String {
        let mut out = String::with_capacity(self.tag.len() + 2 + self.attributes.len() * 16);
        super::writer::write_start_tag(&mut out, self);
        out
    }
}

/// Elements that never have content or an end tag
#[must_use]
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is not markup and is written back verbatim
#[must_use]
pub fn is_raw_text_tag(tag: &str) -> bool {
    matches!(
        tag,
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext"
    )
}

/// Attributes whose presence alone carries their meaning, such as `async`
///
/// The tokenizer reports `alt=""` and a bare `alt` identically, so an empty
/// value is written bare only for these names and as `=""` otherwise.
#[must_use]
pub fn is_boolean_attribute(name: &str) -> bool {
    matches!(
        name,
        "allowfullscreen"
            | "async"
            | "autofocus"
            | "autoplay"
            | "checked"
            | "controls"
            | "default"
            | "defer"
            | "disabled"
            | "formnovalidate"
            | "hidden"
            | "inert"
            | "ismap"
            | "itemscope"
            | "loop"
            | "multiple"
            | "muted"
            | "nomodule"
            | "novalidate"
            | "open"
            | "playsinline"
            | "readonly"
            | "required"
            | "reversed"
            | "selected"
    )
}
