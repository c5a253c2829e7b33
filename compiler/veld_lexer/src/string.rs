//! String and rune literal scanning.
//!
//! Short-form literals end at the first un-escaped quote; long-form
//! (triple-quoted) literals end at a run of three quotes, with a run of
//! four closing the literal on the last quote so delimiters can frame a
//! literal that starts or ends with a quote. A short-form literal whose
//! decoded content is exactly one code point becomes a rune token.
//!
//! A single quote followed by one character and a word break is not a
//! string at all: `'a` in `('a, 'b)` denotes an atom-like identifier, and
//! the scanner re-emits the quote plus the character as one identifier
//! token.

use veld_basic::{SourcePosition, Token, TokenKind, TokenValue};
use veld_diagnostic::DiagId;

use crate::Lexer;

/// Characters that end an atom-like `'x` spelling instead of continuing a
/// string literal.
fn is_word_break(ch: char) -> bool {
    matches!(ch, ')' | ']' | ' ' | ',' | '\t' | '\n')
}

/// How far `%select{file|line}` args index into the unterminated-string
/// message.
const END_OF_FILE: u64 = 0;
const END_OF_LINE: u64 = 1;

impl Lexer<'_> {
    /// Dispatch for a quote character at `begin`.
    ///
    /// Decides between long form, empty short form, and ordinary short
    /// form using only the one-character lookahead: a doubled quote is
    /// either the start of a triple or an empty literal.
    pub(crate) fn quoted_token(&mut self, begin: SourcePosition, quote: char) -> Token {
        if self.peek() == quote {
            self.bump();
            if self.peek() == quote {
                // Long form: consume the second and third delimiter quotes.
                self.bump();
                self.bump();
                // A fourth quote not followed by content quotes extends the
                // opening delimiter, mirroring the four-quote close.
                if self.cur() == quote && self.peek() != quote {
                    self.bump();
                }
                return self.string_token(begin, quote, true);
            }
            // Empty short form.
            let end = self.cur_pos();
            self.bump();
            return self.finish(
                TokenKind::StringConstant,
                begin,
                end,
                TokenValue::Str(String::new()),
            );
        }
        self.bump();
        self.string_token(begin, quote, false)
    }

    /// Scan literal content after the opening delimiter.
    fn string_token(&mut self, begin: SourcePosition, quote: char, long_form: bool) -> Token {
        let mut content = String::new();
        let mut end = begin;
        // Source characters consumed for content, counting escape bytes;
        // the atom disambiguation requires exactly one.
        let mut consumed = 0usize;
        let mut terminated = false;

        loop {
            if self.at_eof() {
                self.report_at(end, DiagId::UnterminatedString)
                    .with_uint(END_OF_FILE)
                    .emit();
                break;
            }
            let ch = self.cur();

            if !long_form && ch == '\n' {
                self.report_at(end, DiagId::UnterminatedString)
                    .with_uint(END_OF_LINE)
                    .emit();
                break;
            }

            if ch == quote {
                if !long_form {
                    end = self.cur_pos();
                    self.bump();
                    terminated = true;
                    break;
                }
                // Long form: count the quote run.
                end = self.cur_pos();
                self.bump();
                if self.cur() == quote {
                    end = self.cur_pos();
                    self.bump();
                    if self.cur() == quote {
                        // Closing triple; a fourth quote joins the
                        // delimiter and closes on the last column.
                        end = self.cur_pos();
                        self.bump();
                        if self.cur() == quote {
                            end = self.cur_pos();
                            self.bump();
                        }
                        terminated = true;
                        break;
                    }
                    content.push(quote);
                    content.push(quote);
                    consumed += 2;
                    continue;
                }
                content.push(quote);
                consumed += 1;
                continue;
            }

            if ch == '\\' {
                end = self.cur_pos();
                self.bump();
                consumed += 1;
                if let Some(decoded) = self.scan_escape(&mut end, &mut consumed) {
                    content.push(decoded);
                }
                continue;
            }

            content.push(ch);
            end = self.cur_pos();
            self.bump();
            consumed += 1;

            // Atom-like identifier: 'x followed by a word break.
            if !long_form
                && quote == '\''
                && consumed == 1
                && is_word_break(self.cur())
            {
                let spelling = format!("'{content}");
                return self.finish(
                    TokenKind::Identifier,
                    begin,
                    end,
                    TokenValue::Str(spelling),
                );
            }
        }

        if !long_form && terminated && content.chars().count() == 1 {
            // One decoded code point in short form is a rune.
            let rune = content.chars().next().unwrap_or('\0');
            return self.finish(TokenKind::RuneConstant, begin, end, TokenValue::Rune(rune));
        }
        self.finish(TokenKind::StringConstant, begin, end, TokenValue::Str(content))
    }

    /// Decode the escape after a consumed backslash. The current character
    /// is the escape selector.
    ///
    /// Bad hex digits warn and contribute zero; an unknown selector is a
    /// fatal diagnostic with the raw character kept as best effort.
    fn scan_escape(&mut self, end: &mut SourcePosition, consumed: &mut usize) -> Option<char> {
        let selector = self.cur();
        match selector {
            'n' | 'r' | 't' | '\\' | '0' => {
                *end = self.cur_pos();
                self.bump();
                *consumed += 1;
                Some(match selector {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '0' => '\0',
                    _ => '\\',
                })
            }
            'x' => {
                *end = self.cur_pos();
                self.bump();
                *consumed += 1;
                let value = self.scan_hex_digits(2, end, consumed);
                Some(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
            }
            'u' | 'U' => {
                *end = self.cur_pos();
                self.bump();
                *consumed += 1;
                let value = self.scan_hex_digits(4, end, consumed);
                Some(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
            }
            _ => {
                let pos = self.cur_pos();
                self.report_at(pos, DiagId::BadEscapeSequence)
                    .with_char(selector)
                    .emit();
                *end = pos;
                self.bump();
                *consumed += 1;
                Some(selector)
            }
        }
    }

    /// Big-endian nibble assembly of exactly `count` hex digits.
    fn scan_hex_digits(&mut self, count: u32, end: &mut SourcePosition, consumed: &mut usize) -> u32 {
        let mut value = 0u32;
        for _ in 0..count {
            if self.at_eof() {
                // The enclosing loop reports the unterminated literal.
                break;
            }
            let ch = self.cur();
            match ch.to_digit(16) {
                Some(digit) => value = value * 16 + digit,
                None => {
                    let pos = self.cur_pos();
                    self.report_at(pos, DiagId::BadHexDigit).with_char(ch).emit();
                    // Zero contribution; the scan continues.
                    value *= 16;
                }
            }
            *end = self.cur_pos();
            self.bump();
            *consumed += 1;
        }
        value
    }
}
