//! The `Source` capability trait and its three backings.
//!
//! A `Source` hands out one decoded Unicode scalar value per `get` call and
//! tracks the (line, column) of the most recently returned character. All
//! backings share the `CharStream` decode core, so BOM skipping, carriage
//! return collapsing, and the deferred-newline position rule behave
//! identically whether the bytes came from a file, a string, or a VFS
//! buffer.
//!
//! Position rule: the position reported alongside a `'\n'` is the position
//! of the newline itself. The line increment (and column reset) is deferred
//! to the start of the *next* `get` call, because callers compute token
//! end-columns from the reported position.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::source_location::SourcePosition;

/// Errors opening or reading a backing file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A pull-based stream of decoded code points with position bookkeeping.
pub trait Source {
    /// True while unread input remains.
    fn has_more(&self) -> bool;

    /// Decode and return the next code point, advancing position
    /// bookkeeping. Returns the `'\0'` sentinel once input is exhausted.
    fn get(&mut self) -> char;

    /// Position of the most recently returned character.
    fn position(&self) -> SourcePosition;

    /// True if a UTF-8 byte-order-mark was detected and skipped.
    fn has_bom(&self) -> bool;

    /// Short display name (file name, or `<string>` for in-memory input).
    fn name(&self) -> &str;

    /// Full path for display and `SourceManager` keying.
    fn path(&self) -> &str;

    /// VFS-provided unique identity, when the bytes came through the VFS.
    fn identity(&self) -> Option<u64>;
}

/// Shared decode core for every `Source` backing.
///
/// Decoding happens up front: `'\r'` never surfaces (bare or as part of
/// `\r\n`), and a leading U+FEFF is recorded and dropped. `get` then only
/// has to manage position state.
struct CharStream {
    chars: Vec<char>,
    idx: usize,
    pos: SourcePosition,
    pending_newline: bool,
    has_bom: bool,
}

impl CharStream {
    fn new(text: &str) -> Self {
        let mut chars = text.chars();
        let mut has_bom = false;
        let mut first = chars.next();
        if first == Some('\u{feff}') {
            has_bom = true;
            first = chars.next();
        }
        let chars: Vec<char> = first
            .into_iter()
            .chain(chars)
            .filter(|&c| c != '\r')
            .collect();
        CharStream {
            chars,
            idx: 0,
            pos: SourcePosition::start(),
            pending_newline: false,
            has_bom,
        }
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        CharStream::new(&String::from_utf8_lossy(bytes))
    }

    fn has_more(&self) -> bool {
        self.idx < self.chars.len()
    }

    fn get(&mut self) -> char {
        if self.pending_newline {
            self.pos.increment_line();
            self.pending_newline = false;
        }
        self.pos.increment_column();

        let ch = match self.chars.get(self.idx) {
            Some(&c) => {
                self.idx += 1;
                c
            }
            None => '\0',
        };
        if ch == '\n' {
            self.pending_newline = true;
        }
        ch
    }
}

/// In-memory string input, used heavily by tests and the REPL.
pub struct StringSource {
    stream: CharStream,
    name: String,
}

impl StringSource {
    pub fn new(text: &str) -> Self {
        StringSource {
            stream: CharStream::new(text),
            name: "<string>".to_string(),
        }
    }

    pub fn with_name(text: &str, name: impl Into<String>) -> Self {
        StringSource {
            stream: CharStream::new(text),
            name: name.into(),
        }
    }
}

impl Source for StringSource {
    fn has_more(&self) -> bool {
        self.stream.has_more()
    }

    fn get(&mut self) -> char {
        self.stream.get()
    }

    fn position(&self) -> SourcePosition {
        self.stream.pos
    }

    fn has_bom(&self) -> bool {
        self.stream.has_bom
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.name
    }

    fn identity(&self) -> Option<u64> {
        None
    }
}

/// File-backed input read through `std::fs`.
pub struct FileSource {
    stream: CharStream,
    name: String,
    path: String,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let bytes = fs::read(path).map_err(|source| SourceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(FileSource {
            stream: CharStream::from_bytes(&bytes),
            name,
            path: path.display().to_string(),
        })
    }
}

impl Source for FileSource {
    fn has_more(&self) -> bool {
        self.stream.has_more()
    }

    fn get(&mut self) -> char {
        self.stream.get()
    }

    fn position(&self) -> SourcePosition {
        self.stream.pos
    }

    fn has_bom(&self) -> bool {
        self.stream.has_bom
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn identity(&self) -> Option<u64> {
        None
    }
}

/// Pre-loaded byte buffer carrying a VFS identity token.
///
/// Produced by `SourceManager::get_file`, which resolves the path through
/// the `FileManager` and tags the buffer with the VFS's unique id so files
/// with identical names in different overlay layers stay distinct.
pub struct BufferSource {
    stream: CharStream,
    name: String,
    path: String,
    identity: u64,
}

impl BufferSource {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        identity: u64,
        bytes: &[u8],
    ) -> Self {
        BufferSource {
            stream: CharStream::from_bytes(bytes),
            name: name.into(),
            path: path.into(),
            identity,
        }
    }
}

impl Source for BufferSource {
    fn has_more(&self) -> bool {
        self.stream.has_more()
    }

    fn get(&mut self) -> char {
        self.stream.get()
    }

    fn position(&self) -> SourcePosition {
        self.stream.pos
    }

    fn has_bom(&self) -> bool {
        self.stream.has_bom
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn identity(&self) -> Option<u64> {
        Some(self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(source: &mut dyn Source) -> Vec<(char, SourcePosition)> {
        let mut out = Vec::new();
        while source.has_more() {
            let ch = source.get();
            out.push((ch, source.position()));
        }
        out
    }

    // === Position bookkeeping ===

    #[test]
    fn first_character_is_column_one() {
        let mut src = StringSource::new("ab");
        assert_eq!(src.position(), SourcePosition::new(1, 0));
        assert_eq!(src.get(), 'a');
        assert_eq!(src.position(), SourcePosition::new(1, 1));
        assert_eq!(src.get(), 'b');
        assert_eq!(src.position(), SourcePosition::new(1, 2));
    }

    #[test]
    fn newline_position_is_the_newline_itself() {
        let mut src = StringSource::new("a\nb");
        assert_eq!(src.get(), 'a');
        assert_eq!(src.get(), '\n');
        // Deferred: still reported on line 1.
        assert_eq!(src.position(), SourcePosition::new(1, 2));
        assert_eq!(src.get(), 'b');
        assert_eq!(src.position(), SourcePosition::new(2, 1));
    }

    #[test]
    fn sentinel_advances_column_once_more() {
        let mut src = StringSource::new(" fn");
        for _ in 0..3 {
            src.get();
        }
        assert!(!src.has_more());
        assert_eq!(src.get(), '\0');
        assert_eq!(src.position(), SourcePosition::new(1, 4));
    }

    #[test]
    fn newline_then_eof_lands_on_next_line() {
        let mut src = StringSource::new("a\n");
        src.get();
        src.get();
        assert_eq!(src.get(), '\0');
        assert_eq!(src.position(), SourcePosition::new(2, 1));
    }

    // === Decode ===

    #[test]
    fn carriage_returns_never_surface() {
        let mut src = StringSource::new("a\r\nb\rc");
        let chars: Vec<char> = drain(&mut src).into_iter().map(|(c, _)| c).collect();
        assert_eq!(chars, vec!['a', '\n', 'b', 'c']);
    }

    #[test]
    fn crlf_counts_as_one_column() {
        let mut src = StringSource::new("a\r\nb");
        src.get();
        assert_eq!(src.get(), '\n');
        assert_eq!(src.position(), SourcePosition::new(1, 2));
        assert_eq!(src.get(), 'b');
        assert_eq!(src.position(), SourcePosition::new(2, 1));
    }

    #[test]
    fn bom_is_skipped_and_reported() {
        let mut src = StringSource::new("\u{feff}x");
        assert!(src.has_bom());
        assert_eq!(src.get(), 'x');
        assert_eq!(src.position(), SourcePosition::new(1, 1));

        let plain = StringSource::new("x");
        assert!(!plain.has_bom());
    }

    #[test]
    fn utf8_bom_bytes_via_buffer() {
        let src = BufferSource::new("m.veld", "/m.veld", 7, b"\xef\xbb\xbfhi");
        assert!(src.has_bom());
        assert_eq!(src.identity(), Some(7));
    }

    #[test]
    fn exhausted_source_keeps_returning_sentinel() {
        let mut src = StringSource::new("");
        assert!(!src.has_more());
        assert_eq!(src.get(), '\0');
        assert_eq!(src.get(), '\0');
        assert!(!src.has_more());
    }

    #[test]
    fn multibyte_scalars_are_single_columns() {
        let mut src = StringSource::new("é¢z");
        assert_eq!(src.get(), 'é');
        assert_eq!(src.get(), '¢');
        assert_eq!(src.get(), 'z');
        assert_eq!(src.position(), SourcePosition::new(1, 3));
    }
}
