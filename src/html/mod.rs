//! HTML event source, filter interface and serializer

pub mod element;
pub mod event;
pub mod filter;
pub mod lexer;
pub mod parse;
pub(crate) mod writer;

pub use element::{Attribute, CloseStyle, ElementId, HtmlElement, QuoteStyle};
pub use event::HtmlEvent;
pub use filter::HtmlFilter;
pub use lexer::HtmlLexer;
pub use parse::{Diagnostic, HtmlParse, Severity};
