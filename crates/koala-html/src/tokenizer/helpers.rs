//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Raw text helpers for `<style>`, `<script>`, `<title>` and friends
//! - Attribute finalization (duplicate removal, reference decoding)

use koala_common::Component;
use koala_dom::Attribute;

use super::character_reference::decode_attribute_value;
use super::state_machine::{HTMLTokenizer, TokenizerState};
use super::token::Token;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Consume the next input character"
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// "If the next few characters are..." (ASCII case-insensitive)
    ///
    /// Looks at the input starting right after the current input character.
    #[must_use]
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input
            .get(self.current_pos..self.current_pos + target.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(target))
    }

    /// Same as [`Self::next_few_characters_are_case_insensitive`] but starting
    /// at the current input character, which has already been consumed.
    #[must_use]
    pub(super) fn current_and_next_characters_are_case_insensitive(&self, target: &str) -> bool {
        let Some(c) = self.current_input_character else {
            return false;
        };
        let start = self.current_pos - c.len_utf8();
        self.input
            .get(start..start + target.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(target))
    }

    /// Advance past `count` bytes of already-matched ASCII input.
    pub(super) const fn skip_bytes(&mut self, count: usize) {
        self.current_pos += count;
    }

    /// "ASCII whitespace" minus CR, which the tokenizer treats like any
    /// whitespace here since input is not newline-normalized.
    pub(super) const fn is_whitespace_char(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current input character as a character token."
    ///
    /// Characters are buffered and emitted as one [`Token::Text`] run.
    pub(super) fn emit_character(&mut self, c: char) {
        self.pending_text.push(c);
    }

    /// Emit several characters at once.
    pub(super) fn emit_characters(&mut self, s: &str) {
        self.pending_text.push_str(s);
    }

    fn flush_text(&mut self) {
        if !self.pending_text.is_empty() {
            let data = std::mem::take(&mut self.pending_text);
            self.token_stream.push(Token::Text { data });
        }
    }

    /// "Emit the current token"
    ///
    /// Start tags for raw text elements switch the tokenizer state here,
    /// since the tokenizer runs ahead of the tree builder.
    pub(super) fn emit_token(&mut self) {
        let Some(mut token) = self.current_token.take() else {
            return;
        };
        self.flush_text();
        if let Token::StartTag {
            name, attributes, ..
        } = &mut token
        {
            self.finalize_attributes(attributes);
            self.last_start_tag_name = Some(name.clone());
            match name.as_str() {
                // [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generic-rcdata-element-parsing-algorithm)
                // "Switch the tokenizer to the RCDATA state."
                "title" | "textarea" => self.switch_to(TokenizerState::RCDATA),
                // [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
                // "Switch the tokenizer to the RAWTEXT state."
                "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                    self.switch_to(TokenizerState::RAWTEXT);
                }
                "script" => self.switch_to(TokenizerState::ScriptData),
                "plaintext" => self.switch_to(TokenizerState::PLAINTEXT),
                _ => {}
            }
        }
        tracing::trace!(?token, "emit");
        self.token_stream.push(token);
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.flush_text();
        self.token_stream.push(Token::EndOfFile);
        self.at_eof = true;
    }

    /// Emit the current token followed by end-of-file.
    pub(super) fn emit_token_and_eof(&mut self) {
        self.emit_token();
        self.emit_eof_token();
    }
}

// =============================================================================
// Raw Text Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        match (&self.last_start_tag_name, &self.current_token) {
            (Some(last), Some(Token::EndTag { name })) => name == last,
            _ => false,
        }
    }

    /// "Anything else":
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer... Reconsume in the RCDATA/RAWTEXT/script data state."
    pub(super) fn emit_raw_end_tag_name_anything_else(&mut self) {
        self.emit_characters("</");
        let buffer = std::mem::take(&mut self.temporary_buffer);
        self.emit_characters(&buffer);
        self.current_token = None;
        self.reconsume_in(self.raw_text_state);
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "if there is already an attribute on the token with the exact same name,
    /// then this is a duplicate-attribute parse error and the new attribute must
    /// be removed from the token."
    ///
    /// Also decodes character references in every value.
    fn finalize_attributes(&mut self, attributes: &mut Vec<Attribute>) {
        let mut kept: Vec<Attribute> = Vec::with_capacity(attributes.len());
        for mut attr in attributes.drain(..) {
            if kept.iter().any(|a| a.name == attr.name) {
                self.log_parse_error("duplicate-attribute");
                continue;
            }
            attr.value = decode_attribute_value(&attr.value);
            kept.push(attr);
        }
        *attributes = kept;
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Parse errors are recorded and parsing continues.
    pub(super) fn log_parse_error(&mut self, code: &str) {
        let pos = self.current_pos;
        self.diagnostics
            .warn(Component::Html, format!("{code} parse error at byte {pos}"));
    }
}
