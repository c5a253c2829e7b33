//! Hand-written stateful lexer for Veld.
//!
//! `Lexer::lex` returns exactly one token per call, forward-only, ending in
//! a sticky `eof` token. The scanner keeps a one-character lookahead over
//! its `Source`, mirrors every character it reads into the owning file's
//! line store (so diagnostics can echo source lines), and reports lexical
//! problems through the bound `DiagnosticEngine`. Fatal severity is the
//! only hard-stop signal; the lexer itself never panics on malformed
//! input.
//!
//! Token ranges are inclusive on both ends: `begin` is the position of the
//! first character of the token and `end` the position of the last
//! character consumed for it.

mod number;
mod string;

#[cfg(test)]
mod tests;

use tracing::trace;

use veld_basic::{
    FileId, IdentifierTable, PunctuatorTable, Source, SourceLocation, SourceManager,
    SourcePosition, SourceRange, Token, TokenKind, TokenValue,
};
use veld_diagnostic::DiagnosticEngine;

/// One buffered character and the position it was read at.
#[derive(Copy, Clone)]
struct Slot {
    ch: char,
    pos: SourcePosition,
}

/// The lexer. Bound to one `Source` for its entire lifetime; rescanning
/// requires a fresh lexer over a fresh source.
pub struct Lexer<'a> {
    source: &'a mut dyn Source,
    source_manager: &'a mut SourceManager,
    engine: &'a mut DiagnosticEngine,
    file: FileId,
    identifiers: IdentifierTable,
    punctuators: PunctuatorTable,
    cur: Option<Slot>,
    next: Option<Slot>,
}

/// Unicode whitespace skipped between tokens. Excludes `'\n'`, which is a
/// token of its own.
fn is_space(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{00a0}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || (ch >= '\u{80}' && !is_space(ch))
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || (ch >= '\u{80}' && !is_space(ch))
}

impl<'a> Lexer<'a> {
    pub fn new(
        source: &'a mut dyn Source,
        source_manager: &'a mut SourceManager,
        engine: &'a mut DiagnosticEngine,
    ) -> Self {
        let file = source_manager.register_source(source);
        Lexer {
            source,
            source_manager,
            engine,
            file,
            identifiers: IdentifierTable::new(),
            punctuators: PunctuatorTable::new(),
            cur: None,
            next: None,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// True once the bound engine has seen a Fatal diagnostic. Drivers
    /// check this between tokens to honor the hard-stop contract.
    pub fn fatal_occurred(&self) -> bool {
        self.engine.fatal_occurred()
    }

    // === Character machinery ===

    /// Read one character from the source, mirroring it into the file's
    /// line store.
    fn pull(&mut self) -> Slot {
        let ch = self.source.get();
        let pos = self.source.position();
        if ch != '\0' && ch != '\n' {
            self.source_manager
                .file_info_mut(self.file)
                .add_character(pos, ch);
        }
        Slot { ch, pos }
    }

    fn prime(&mut self) {
        if self.cur.is_none() {
            self.cur = Some(self.pull());
        }
    }

    /// Current character, priming the lookahead on first use.
    fn cur(&mut self) -> char {
        self.prime();
        // Primed above; the slot is always present.
        self.cur.map_or('\0', |slot| slot.ch)
    }

    /// Position of the current character.
    fn cur_pos(&mut self) -> SourcePosition {
        self.prime();
        self.cur.map_or_else(SourcePosition::start, |slot| slot.pos)
    }

    /// Second lookahead slot, filled without consuming.
    fn peek(&mut self) -> char {
        self.prime();
        if self.next.is_none() {
            self.next = Some(self.pull());
        }
        self.next.map_or('\0', |slot| slot.ch)
    }

    /// Consume the current character.
    fn bump(&mut self) {
        self.prime();
        self.cur = match self.next.take() {
            Some(slot) => Some(slot),
            None => Some(self.pull()),
        };
    }

    /// True once the source is drained and the sentinel has surfaced.
    fn at_eof(&mut self) -> bool {
        self.cur() == '\0' && !self.source.has_more()
    }

    fn location(&self, begin: SourcePosition, end: SourcePosition) -> SourceLocation {
        SourceLocation::new(self.file, SourceRange::new(begin, end))
    }

    /// Open a diagnostic pinned to a single position.
    pub(crate) fn report_at(
        &mut self,
        pos: SourcePosition,
        id: veld_diagnostic::DiagId,
    ) -> veld_diagnostic::DiagnosticBuilder<'_> {
        let location = self.location(pos, pos);
        self.engine.report(Some(location), id)
    }

    // === Top-level dispatch ===

    /// Produce the next token.
    ///
    /// Forward-only; after `eof` every further call returns `eof` again.
    pub fn lex(&mut self) -> Token {
        loop {
            // Whitespace moves the start of the upcoming token forward.
            while is_space(self.cur()) {
                self.bump();
            }

            // Line comments run to the end of the line; the newline itself
            // still produces its eol token.
            if self.cur() == '#' {
                while self.cur() != '\n' && !self.at_eof() {
                    self.bump();
                }
                continue;
            }

            let begin = self.cur_pos();
            let ch = self.cur();

            if ch == '\n' {
                self.bump();
                return self.finish(TokenKind::Eol, begin, begin, TokenValue::None);
            }

            if self.at_eof() {
                return self.finish(TokenKind::Eof, begin, begin, TokenValue::None);
            }

            if ch == '\'' || ch == '"' {
                return self.quoted_token(begin, ch);
            }

            if self.punctuators.is_prefix(ch.to_string().as_str()) {
                return self.punctuator_token(begin);
            }

            if is_identifier_start(ch) {
                return self.identifier_token(begin);
            }

            if ch.is_ascii_digit() {
                return self.number_token(begin);
            }

            // A single unrecognized character, still consumed.
            self.bump();
            return self.finish(
                TokenKind::Unknown,
                begin,
                begin,
                TokenValue::Str(ch.to_string()),
            );
        }
    }

    fn finish(
        &mut self,
        kind: TokenKind,
        begin: SourcePosition,
        end: SourcePosition,
        value: TokenValue,
    ) -> Token {
        trace!(kind = kind.name(), %begin, %end, "lexed token");
        Token::new(kind, self.location(begin, end), value)
    }

    // === Sub-scanners ===

    /// Greedy longest-prefix punctuator match.
    ///
    /// Extends the candidate while some table entry still has it as a
    /// prefix; the table is prefix-closed, so the final candidate is
    /// always an exact hit.
    fn punctuator_token(&mut self, begin: SourcePosition) -> Token {
        let mut spelling = String::from(self.cur());
        let mut end = self.cur_pos();

        loop {
            let mut candidate = spelling.clone();
            candidate.push(self.peek());
            if self.punctuators.is_prefix(&candidate) {
                self.bump();
                spelling = candidate;
                end = self.cur_pos();
            } else {
                break;
            }
        }
        self.bump();

        match self.punctuators.get(&spelling) {
            Some(info) => self.finish(info.kind, begin, end, TokenValue::None),
            None => self.finish(TokenKind::Unknown, begin, end, TokenValue::Str(spelling)),
        }
    }

    fn identifier_token(&mut self, begin: SourcePosition) -> Token {
        let mut spelling = String::new();
        let mut end = begin;

        while is_identifier_continue(self.cur()) {
            spelling.push(self.cur());
            end = self.cur_pos();
            self.bump();
        }

        match self.identifiers.get(&spelling) {
            Some(info) => self.finish(info.kind, begin, end, TokenValue::None),
            None => self.finish(
                TokenKind::Identifier,
                begin,
                end,
                TokenValue::Str(spelling),
            ),
        }
    }
}
