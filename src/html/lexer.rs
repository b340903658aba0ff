//! Tokenization of HTML text into document events
//!
//! Built on the `html5ever` tokenizer. No tree builder is involved: the token
//! sink switches the tokenizer into the raw-text states itself (the part of
//! tree construction the tokenizer depends on), and `HtmlParse` keeps a plain
//! open-element stack. Markup is never reparented, so rewritten output keeps
//! the author's structure.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::TokenizerResult;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Doctype, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};

use super::element::{QuoteStyle, is_boolean_attribute};
use super::parse::HtmlParse;

/// Tokens buffered between a `feed` and the next drain into `HtmlParse`
#[derive(Debug)]
enum LexToken {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
        line: u64,
    },
    EndTag {
        name: String,
        line: u64,
    },
    Text {
        text: String,
        line: u64,
    },
    Comment {
        text: String,
        line: u64,
    },
    Doctype {
        text: String,
        line: u64,
    },
}

#[derive(Default)]
struct TokenCollector {
    tokens: RefCell<Vec<LexToken>>,
}

impl TokenCollector {
    fn push_text(&self, text: &str, line: u64) {
        let mut tokens = self.tokens.borrow_mut();
        if let Some(LexToken::Text { text: last, .. }) = tokens.last_mut() {
            last.push_str(text);
            return;
        }
        tokens.push(LexToken::Text {
            text: text.to_string(),
            line,
        });
    }

    fn start_tag(&self, tag: Tag, line: u64) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let next_state = match name.as_str() {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
            "plaintext" => TokenSinkResult::Plaintext,
            _ => TokenSinkResult::Continue,
        };
        let attrs = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        self.tokens.borrow_mut().push(LexToken::StartTag {
            name,
            attrs,
            self_closing: tag.self_closing,
            line,
        });
        next_state
    }
}

fn doctype_text(doctype: &Doctype) -> String {
    let mut text = String::from("DOCTYPE");
    if let Some(name) = &doctype.name {
        text.push(' ');
        text.push_str(name);
    }
    match (&doctype.public_id, &doctype.system_id) {
        (Some(public_id), Some(system_id)) => {
            text.push_str(&format!(" PUBLIC \"{public_id}\" \"{system_id}\""));
        }
        (Some(public_id), None) => text.push_str(&format!(" PUBLIC \"{public_id}\"")),
        (None, Some(system_id)) => text.push_str(&format!(" SYSTEM \"{system_id}\"")),
        (None, None) => {}
    }
    text
}

impl TokenSink for TokenCollector {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(tag, line_number),
                TagKind::EndTag => self.tokens.borrow_mut().push(LexToken::EndTag {
                    name: tag.name.to_string(),
                    line: line_number,
                }),
            },
            Token::CharacterTokens(text) => self.push_text(&text, line_number),
            Token::NullCharacterToken => self.push_text("\u{FFFD}", line_number),
            Token::CommentToken(text) => self.tokens.borrow_mut().push(LexToken::Comment {
                text: text.to_string(),
                line: line_number,
            }),
            Token::DoctypeToken(doctype) => self.tokens.borrow_mut().push(LexToken::Doctype {
                text: doctype_text(&doctype),
                line: line_number,
            }),
            Token::ParseError(message) => {
                log::trace!("html tokenizer: line {line_number}: {message}");
            }
            Token::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}

/// Incremental HTML lexer feeding an `HtmlParse`
pub struct HtmlLexer {
    tokenizer: Tokenizer<TokenCollector>,
    input: BufferQueue,
}

impl Default for HtmlLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlLexer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(TokenCollector::default(), TokenizerOpts::default()),
            input: BufferQueue::default(),
        }
    }

    /// Tokenize `text` and append the resulting events to `parse`
    ///
    /// Text may arrive in arbitrary chunks; a construct split across two calls
    /// is completed by the later call.
    pub fn parse_text(&mut self, text: &str, parse: &mut HtmlParse) {
        self.input.push_back(StrTendril::from_slice(text));
        match self.tokenizer.feed(&self.input) {
            TokenizerResult::Done => {}
            // Only a tree builder asks to pause for a script; the sink never does
            TokenizerResult::Script(_) => {
                log::warn!("html tokenizer paused at a script in {}", parse.url());
            }
        }
        self.drain(parse);
    }

    /// Flush any construct still pending in the tokenizer
    pub fn finish(&mut self, parse: &mut HtmlParse) {
        self.tokenizer.end();
        self.drain(parse);
    }

    fn drain(&mut self, parse: &mut HtmlParse) {
        let tokens = std::mem::take(&mut *self.tokenizer.sink.tokens.borrow_mut());
        for token in tokens {
            apply_token(token, parse);
        }
    }
}

fn apply_token(token: LexToken, parse: &mut HtmlParse) {
    match token {
        LexToken::StartTag {
            name,
            attrs,
            self_closing,
            line,
        } => {
            parse.set_line(line);
            let element = parse.new_element(&name);
            for (attr_name, value) in attrs {
                let quote = if value.is_empty() && is_boolean_attribute(&attr_name) {
                    QuoteStyle::None
                } else {
                    QuoteStyle::Double
                };
                parse.add_attribute(element, attr_name, value, quote);
            }
            if self_closing {
                parse.add_brief_element(element);
            } else {
                parse.add_element(element);
            }
        }
        LexToken::EndTag { name, line } => {
            parse.set_line(line);
            parse.close_element(&name);
        }
        LexToken::Text { text, line } => {
            parse.set_line(line);
            parse.characters(text);
        }
        LexToken::Comment { text, line } => {
            parse.set_line(line);
            if let Some(cdata) = text
                .strip_prefix("[CDATA[")
                .and_then(|rest| rest.strip_suffix("]]"))
            {
                parse.cdata(cdata);
            } else if text.starts_with("[if ") || text.starts_with("[endif") {
                parse.ie_directive(text);
            } else {
                parse.comment(text);
            }
        }
        LexToken::Doctype { text, line } => {
            parse.set_line(line);
            parse.directive(text);
        }
    }
}
