//! Numeric literal scanning.
//!
//! Explicit state machine over {IntPart, Fraction, Exponent, Done}.
//! Handles `0x`/`0b` base prefixes, `_` separators (dropped from the
//! numeric text), fractions, and scientific notation. A `.` followed by
//! another `.` or by `)` never starts a fraction; that spelling is
//! reserved for range syntax like `1..2`.

use veld_basic::{SourcePosition, Token, TokenKind, TokenValue};
use veld_diagnostic::DiagId;

use crate::Lexer;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum NumState {
    IntPart,
    Fraction,
    Exponent,
    Done,
}

fn is_digit_for(ch: char, base: u32) -> bool {
    ch.to_digit(base).is_some()
}

impl Lexer<'_> {
    /// Scan a numeric literal; the current character is its first digit.
    pub(crate) fn number_token(&mut self, begin: SourcePosition) -> Token {
        let mut text = String::new();
        let mut end = self.cur_pos();
        let mut base = 10u32;
        let mut is_real = false;

        // Base prefix.
        if self.cur() == '0' && (self.peek() == 'x' || self.peek() == 'b') {
            base = if self.peek() == 'x' { 16 } else { 2 };
            self.bump();
            end = self.cur_pos();
            self.bump();
        }

        let mut state = NumState::IntPart;
        while state != NumState::Done {
            let ch = self.cur();
            match state {
                NumState::IntPart => {
                    if ch == '_' {
                        // Visual separator; not part of the numeric text.
                        end = self.cur_pos();
                        self.bump();
                    } else if is_digit_for(ch, base) {
                        text.push(ch);
                        end = self.cur_pos();
                        self.bump();
                    } else if base == 16 && ch.is_ascii_alphanumeric() {
                        let pos = self.cur_pos();
                        self.report_at(pos, DiagId::BadHexDigit).with_char(ch).emit();
                        end = pos;
                        self.bump();
                    } else if base == 2 && ch.is_ascii_digit() {
                        let pos = self.cur_pos();
                        self.report_at(pos, DiagId::BadBinaryDigit)
                            .with_char(ch)
                            .emit();
                        end = pos;
                        self.bump();
                    } else if ch == '.' && base == 10 {
                        if self.peek() == '.' || self.peek() == ')' {
                            state = NumState::Done;
                        } else {
                            is_real = true;
                            text.push('.');
                            end = self.cur_pos();
                            self.bump();
                            state = NumState::Fraction;
                        }
                    } else if (ch == 'e' || ch == 'E') && base == 10 {
                        is_real = true;
                        self.enter_exponent(&mut text, &mut end);
                        state = NumState::Exponent;
                    } else {
                        state = NumState::Done;
                    }
                }
                NumState::Fraction => {
                    if ch == '_' {
                        end = self.cur_pos();
                        self.bump();
                    } else if ch.is_ascii_digit() {
                        text.push(ch);
                        end = self.cur_pos();
                        self.bump();
                    } else if ch == 'e' || ch == 'E' {
                        self.enter_exponent(&mut text, &mut end);
                        state = NumState::Exponent;
                    } else {
                        state = NumState::Done;
                    }
                }
                NumState::Exponent => {
                    if ch == '_' {
                        end = self.cur_pos();
                        self.bump();
                    } else if ch.is_ascii_digit() {
                        text.push(ch);
                        end = self.cur_pos();
                        self.bump();
                    } else {
                        state = NumState::Done;
                    }
                }
                NumState::Done => {}
            }
        }

        if is_real {
            let value = text.parse::<f64>().unwrap_or(0.0);
            self.finish(
                TokenKind::RealConstant,
                begin,
                end,
                TokenValue::Real(value),
            )
        } else {
            // Empty text happens when every digit of a based literal was
            // invalid; the warnings already went out.
            let value = u64::from_str_radix(&text, base).unwrap_or(0);
            self.finish(
                TokenKind::IntegerConstant,
                begin,
                end,
                TokenValue::Int(value),
            )
        }
    }

    /// Consume `e`/`E` and an optional explicit sign.
    fn enter_exponent(&mut self, text: &mut String, end: &mut SourcePosition) {
        text.push('e');
        *end = self.cur_pos();
        self.bump();
        if self.cur() == '+' || self.cur() == '-' {
            text.push(self.cur());
            *end = self.cur_pos();
            self.bump();
        }
    }
}
