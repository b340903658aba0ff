//! Drives a document through the registered filters
//!
//! The driver owns the event source for one document at a time. Text is lexed
//! into the current window as it arrives; `flush` runs every filter over the
//! window in registration order (each filter sees the whole window before the
//! next one starts, then a flush), serializes it and starts a new window.

use std::sync::Arc;

use tracing::debug;

use super::img_rewrite_filter::ImgRewriteFilter;
use super::outline_filter::OutlineFilter;
use crate::config::{RewriteConfig, RewriterKind};
use crate::html::{Diagnostic, HtmlFilter, HtmlLexer, HtmlParse};
use crate::resource::ResourceStore;

/// URL used when text arrives before `start_parse`
const UNKNOWN_DOCUMENT_URL: &str = "about:blank";

struct Document {
    parse: HtmlParse,
    lexer: HtmlLexer,
    output: String,
}

impl Document {
    fn new(url: &str) -> Self {
        let mut parse = HtmlParse::new(url);
        parse.start_document();
        Self {
            parse,
            lexer: HtmlLexer::new(),
            output: String::new(),
        }
    }
}

pub struct RewriteDriver {
    filters: Vec<Box<dyn HtmlFilter>>,
    document: Option<Document>,
    /// Diagnostics of the last finished document
    diagnostics: Vec<Diagnostic>,
}

impl RewriteDriver {
    /// A driver with the filters `config` enables, in configuration order
    ///
    /// CSS and JavaScript outlining share one `OutlineFilter`, registered at
    /// the position of whichever of the two comes first.
    pub fn new(config: &RewriteConfig, store: Arc<dyn ResourceStore>) -> Self {
        let mut driver = Self {
            filters: Vec::new(),
            document: None,
            diagnostics: Vec::new(),
        };

        let mut outline_registered = false;
        for kind in config.filters() {
            match kind {
                RewriterKind::OutlineCss | RewriterKind::OutlineJavascript => {
                    if !outline_registered {
                        driver.add_filter(Box::new(OutlineFilter::new(
                            Arc::clone(&store),
                            config.is_enabled(RewriterKind::OutlineCss),
                            config.is_enabled(RewriterKind::OutlineJavascript),
                        )));
                        outline_registered = true;
                    }
                }
                RewriterKind::RewriteImages => {
                    driver.add_filter(Box::new(ImgRewriteFilter::new(
                        Arc::clone(&store),
                        config.jpeg_quality(),
                        config.enable_gif(),
                    )));
                }
            }
        }
        driver
    }

    /// Register a filter after those already registered
    pub fn add_filter(&mut self, filter: Box<dyn HtmlFilter>) {
        debug!("Registered filter {}", filter.name());
        self.filters.push(filter);
    }

    #[must_use]
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    /// Begin a document; relative references resolve against `url`
    ///
    /// A document still in progress is discarded.
    pub fn start_parse(&mut self, url: &str) {
        if let Some(previous) = self.document.take() {
            log::warn!(
                "Discarding unfinished document {} for {url}",
                previous.parse.url()
            );
        }
        self.document = Some(Document::new(url));
    }

    fn document(&mut self) -> &mut Document {
        self.document
            .get_or_insert_with(|| Document::new(UNKNOWN_DOCUMENT_URL))
    }

    /// Lex a chunk of the document into the current window
    pub fn parse_text(&mut self, text: &str) {
        let document = self.document();
        document.lexer.parse_text(text, &mut document.parse);
    }

    /// Run the filters over the current window and serialize it
    pub fn flush(&mut self) {
        let document = self
            .document
            .get_or_insert_with(|| Document::new(UNKNOWN_DOCUMENT_URL));
        run_filters(&mut self.filters, document);
    }

    /// Close the document, flush it and return the rewritten HTML
    pub fn finish_parse(&mut self) -> String {
        let mut document = self
            .document
            .take()
            .unwrap_or_else(|| Document::new(UNKNOWN_DOCUMENT_URL));
        document.lexer.finish(&mut document.parse);
        document.parse.end_document();
        run_filters(&mut self.filters, &mut document);

        self.diagnostics = document.parse.diagnostics().to_vec();
        tracing::info!(
            url = document.parse.url(),
            bytes = document.output.len(),
            diagnostics = self.diagnostics.len(),
            "Finished rewriting document"
        );
        document.output
    }

    /// Diagnostics of the document in progress, or of the last finished one
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match &self.document {
            Some(document) => document.parse.diagnostics(),
            None => &self.diagnostics,
        }
    }
}

fn run_filters(filters: &mut [Box<dyn HtmlFilter>], document: &mut Document) {
    let span = tracing::debug_span!("rewrite_window", url = %document.parse.url());
    let _enter = span.enter();

    for filter in filters.iter_mut() {
        debug!("Applying {}", filter.name());
        document.parse.apply_filter(filter.as_mut());
    }
    document.parse.flush_window(&mut document.output);
}

/// Rewrite a complete document in one call
pub fn rewrite_html(
    config: &RewriteConfig,
    store: Arc<dyn ResourceStore>,
    base_url: &str,
    html: &str,
) -> String {
    let mut driver = RewriteDriver::new(config, store);
    driver.start_parse(base_url);
    driver.parse_text(html);
    driver.finish_parse()
}
