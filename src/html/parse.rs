//! Per-document event window, element arena and mutation API
//!
//! `HtmlParse` is the element event source: a lexer (or any other producer)
//! appends events through the builder methods, the driver runs each filter over
//! the queued window, and the writer serializes and clears it on flush.
//!
//! Filters mutate the document only through this type. Mutations are limited
//! to the current window: an element whose start or end event has already been
//! flushed cannot be deleted or replaced.

use super::element::{Attribute, CloseStyle, ElementId, HtmlElement, QuoteStyle, is_void_tag};
use super::event::{HtmlEvent, QueuedEvent};
use super::filter::HtmlFilter;
use super::writer::HtmlWriter;

/// Severity of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message recorded against the document while it was processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u64,
    pub message: String,
}

pub struct HtmlParse {
    url: String,
    elements: Vec<HtmlElement>,
    queue: Vec<QueuedEvent>,
    /// Index of the next event to dispatch while a filter is being applied
    next_event: usize,
    open_elements: Vec<ElementId>,
    current_line: u64,
    diagnostics: Vec<Diagnostic>,
    writer: HtmlWriter,
}

impl HtmlParse {
    /// Create an event source for the document at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            elements: Vec::new(),
            queue: Vec::new(),
            next_event: 0,
            open_elements: Vec::new(),
            current_line: 1,
            diagnostics: Vec::new(),
            writer: HtmlWriter::default(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics at or above `severity`
    pub fn diagnostics_at_least(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.severity >= severity)
    }

    #[must_use]
    pub fn current_line(&self) -> u64 {
        self.current_line
    }

    pub(crate) fn set_line(&mut self, line: u64) {
        self.current_line = line;
    }

    /// Events currently queued in the window
    pub fn events(&self) -> impl Iterator<Item = &HtmlEvent> {
        self.queue.iter().map(|queued| &queued.event)
    }

    // ------------------------------------------------------------------
    // Element arena
    // ------------------------------------------------------------------

    /// Allocate a detached element. It joins the document once added or inserted.
    pub fn new_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(HtmlElement::new(tag, self.current_line));
        id
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> &HtmlElement {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut HtmlElement {
        &mut self.elements[id.0]
    }

    pub fn add_attribute(
        &mut self,
        id: ElementId,
        name: impl Into<String>,
        value: impl Into<String>,
        quote: QuoteStyle,
    ) {
        self.elements[id.0].add_attribute(Attribute::new(name, value, quote));
    }

    #[must_use]
    pub fn find_attribute(&self, id: ElementId, name: &str) -> Option<&Attribute> {
        self.elements[id.0].find_attribute(name)
    }

    /// Start tag of the element as it would be written, for log messages
    #[must_use]
    pub fn element_to_string(&self, id: ElementId) -> String {
        self.elements[id.0].start_tag_string()
    }

    // ------------------------------------------------------------------
    // Event construction
    // ------------------------------------------------------------------

    fn push(&mut self, event: HtmlEvent) {
        self.queue.push(QueuedEvent {
            event,
            line: self.current_line,
        });
    }

    pub fn start_document(&mut self) {
        self.push(HtmlEvent::StartDocument);
    }

    /// Append an element's start event. Void elements are closed immediately.
    pub fn add_element(&mut self, id: ElementId) {
        self.push(HtmlEvent::StartElement(id));
        let element = &self.elements[id.0];
        if is_void_tag(element.tag()) {
            self.elements[id.0].close_style = CloseStyle::Implicit;
            self.push(HtmlEvent::EndElement(id));
        } else {
            self.open_elements.push(id);
        }
    }

    /// Append a start event that is immediately closed with `<tag/>`
    pub fn add_brief_element(&mut self, id: ElementId) {
        self.push(HtmlEvent::StartElement(id));
        self.elements[id.0].close_style = CloseStyle::Brief;
        self.push(HtmlEvent::EndElement(id));
    }

    /// Close the innermost open element named `tag` with an explicit end tag
    ///
    /// Open elements nested inside it are closed implicitly first. When no
    /// element with that name is open a warning is recorded, the end tag is
    /// kept as a stray event so it is written back unchanged, and false is
    /// returned.
    pub fn close_element(&mut self, tag: &str) -> bool {
        let Some(position) = self
            .open_elements
            .iter()
            .rposition(|id| self.elements[id.0].tag.eq_ignore_ascii_case(tag))
        else {
            self.warning_here(format!("Unexpected close-tag '</{tag}>', no matching open tag"));
            self.push(HtmlEvent::StrayEndTag(tag.to_string()));
            return false;
        };

        while self.open_elements.len() > position + 1 {
            if let Some(inner) = self.open_elements.pop() {
                self.elements[inner.0].close_style = CloseStyle::Unclosed;
                self.push(HtmlEvent::EndElement(inner));
            }
        }
        if let Some(id) = self.open_elements.pop() {
            self.elements[id.0].close_style = CloseStyle::Explicit;
            self.push(HtmlEvent::EndElement(id));
        }
        true
    }

    /// Character data; whitespace-only runs are reported as ignorable whitespace
    pub fn characters(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if text.chars().all(char::is_whitespace) {
            self.push(HtmlEvent::IgnorableWhitespace(text));
        } else {
            self.push(HtmlEvent::Characters(text));
        }
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.push(HtmlEvent::Comment(text.into()));
    }

    pub fn cdata(&mut self, text: impl Into<String>) {
        self.push(HtmlEvent::Cdata(text.into()));
    }

    pub fn ie_directive(&mut self, text: impl Into<String>) {
        self.push(HtmlEvent::IeDirective(text.into()));
    }

    pub fn directive(&mut self, text: impl Into<String>) {
        self.push(HtmlEvent::Directive(text.into()));
    }

    /// Close every element still open and append the end-of-document event
    pub fn end_document(&mut self) {
        while let Some(id) = self.open_elements.pop() {
            self.elements[id.0].close_style = CloseStyle::Unclosed;
            self.push(HtmlEvent::EndElement(id));
        }
        self.push(HtmlEvent::EndDocument);
    }

    // ------------------------------------------------------------------
    // Filter application
    // ------------------------------------------------------------------

    /// Run one filter over every queued event, then deliver `flush`
    pub fn apply_filter(&mut self, filter: &mut dyn HtmlFilter) {
        self.next_event = 0;
        while self.next_event < self.queue.len() {
            let queued = self.queue[self.next_event].clone();
            self.next_event += 1;
            self.current_line = queued.line;

            match queued.event {
                HtmlEvent::StartDocument => filter.start_document(self),
                HtmlEvent::EndDocument => filter.end_document(self),
                HtmlEvent::StartElement(id) => filter.start_element(self, id),
                HtmlEvent::EndElement(id) => filter.end_element(self, id),
                HtmlEvent::Characters(text) => filter.characters(self, &text),
                HtmlEvent::IgnorableWhitespace(text) => filter.ignorable_whitespace(self, &text),
                HtmlEvent::Comment(text) => filter.comment(self, &text),
                HtmlEvent::Cdata(text) => filter.cdata(self, &text),
                HtmlEvent::IeDirective(text) => filter.ie_directive(self, &text),
                HtmlEvent::Directive(text) => filter.directive(self, &text),
                HtmlEvent::StrayEndTag(_) => {}
            }
        }
        self.next_event = self.queue.len();
        filter.flush(self);
    }

    /// Serialize the window into `out` and start a new, empty window
    pub fn flush_window(&mut self, out: &mut String) {
        let queue = std::mem::take(&mut self.queue);
        for queued in &queue {
            self.writer.write_event(out, &queued.event, &self.elements);
        }
        self.next_event = 0;
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    fn start_index(&self, id: ElementId) -> Option<usize> {
        self.queue
            .iter()
            .position(|queued| queued.event == HtmlEvent::StartElement(id))
    }

    fn end_index(&self, id: ElementId) -> Option<usize> {
        self.queue
            .iter()
            .rposition(|queued| queued.event == HtmlEvent::EndElement(id))
    }

    /// Whether both the start and the end of the element are in this window
    #[must_use]
    pub fn is_rewritable(&self, id: ElementId) -> bool {
        matches!(
            (self.start_index(id), self.end_index(id)),
            (Some(start), Some(end)) if start < end
        )
    }

    fn insert_element_at(&mut self, index: usize, id: ElementId) {
        let line = self.current_line;
        self.queue.insert(
            index,
            QueuedEvent {
                event: HtmlEvent::EndElement(id),
                line,
            },
        );
        self.queue.insert(
            index,
            QueuedEvent {
                event: HtmlEvent::StartElement(id),
                line,
            },
        );
        if index < self.next_event {
            self.next_event += 2;
        }
    }

    /// Insert a childless element immediately before `existing`'s start tag
    ///
    /// Returns false if `existing` does not start in this window.
    pub fn insert_element_before_element(&mut self, existing: ElementId, id: ElementId) -> bool {
        match self.start_index(existing) {
            Some(index) => {
                self.insert_element_at(index, id);
                true
            }
            None => false,
        }
    }

    /// Remove an element together with everything between its start and end
    ///
    /// Returns false if the element is not wholly inside this window.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        let (Some(start), Some(end)) = (self.start_index(id), self.end_index(id)) else {
            return false;
        };
        if start >= end {
            return false;
        }

        let removed = end - start + 1;
        self.queue.drain(start..=end);
        if self.next_event > end {
            self.next_event -= removed;
        } else if self.next_event > start {
            self.next_event = start;
        }
        true
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    fn diagnose(&mut self, severity: Severity, message: String) {
        let line = self.current_line;
        match severity {
            Severity::Info => log::info!("{}:{}: {}", self.url, line, message),
            Severity::Warning => log::warn!("{}:{}: {}", self.url, line, message),
            Severity::Error => log::error!("{}:{}: {}", self.url, line, message),
        }
        self.diagnostics.push(Diagnostic {
            severity,
            line,
            message,
        });
    }

    pub fn info_here(&mut self, message: impl Into<String>) {
        self.diagnose(Severity::Info, message.into());
    }

    pub fn warning_here(&mut self, message: impl Into<String>) {
        self.diagnose(Severity::Warning, message.into());
    }

    pub fn error_here(&mut self, message: impl Into<String>) {
        self.diagnose(Severity::Error, message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(parse: &mut HtmlParse) -> String {
        let mut out = String::new();
        parse.flush_window(&mut out);
        out
    }

    #[test]
    fn close_element_closes_intervening_elements_implicitly() {
        let mut parse = HtmlParse::new("http://example.com/");
        let div = parse.new_element("div");
        parse.add_element(div);
        let p = parse.new_element("p");
        parse.add_element(p);
        parse.characters("text");
        assert!(parse.close_element("div"));

        assert_eq!(parse.element(p).close_style(), CloseStyle::Unclosed);
        assert_eq!(parse.element(div).close_style(), CloseStyle::Explicit);
        assert_eq!(serialize(&mut parse), "<div><p>text</div>");
    }

    #[test]
    fn stray_close_tag_is_a_warning() {
        let mut parse = HtmlParse::new("http://example.com/");
        assert!(!parse.close_element("span"));
        assert_eq!(parse.diagnostics().len(), 1);
        assert_eq!(parse.diagnostics()[0].severity, Severity::Warning);
        assert_eq!(serialize(&mut parse), "</span>");
    }

    #[test]
    fn delete_element_removes_contents() {
        let mut parse = HtmlParse::new("http://example.com/");
        let style = parse.new_element("style");
        parse.add_element(style);
        parse.characters("b{}");
        parse.close_element("style");
        parse.characters("after");

        assert!(parse.is_rewritable(style));
        assert!(parse.delete_element(style));
        assert!(!parse.is_rewritable(style));
        assert_eq!(serialize(&mut parse), "after");
    }

    #[test]
    fn insert_before_element_keeps_order() {
        let mut parse = HtmlParse::new("http://example.com/");
        let first = parse.new_element("b");
        parse.add_element(first);
        parse.close_element("b");

        let inserted = parse.new_element("i");
        assert!(parse.insert_element_before_element(first, inserted));
        assert_eq!(serialize(&mut parse), "<i></i><b></b>");
    }

    #[test]
    fn elements_split_by_a_flush_are_not_rewritable() {
        let mut parse = HtmlParse::new("http://example.com/");
        let div = parse.new_element("div");
        parse.add_element(div);
        let _ = serialize(&mut parse);
        parse.close_element("div");

        assert!(!parse.is_rewritable(div));
        assert!(!parse.delete_element(div));
    }
}
