//! Source positions, ranges, and locations.
//!
//! Positions are 1-based in the line and track the column of the most
//! recently consumed character. A fresh position sits at line 1, column 0;
//! the first character of a line therefore reads as column 1.

use std::fmt;

/// Dense handle for a file registered with the `SourceManager`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Handle used for sources that were never registered (tests, REPL).
    pub const UNREGISTERED: FileId = FileId(u32::MAX);
}

/// A (line, column) pair within one file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    /// Starting position of a fresh source: line 1, column 0.
    ///
    /// Column 0 means "no character consumed yet on this line".
    #[inline]
    pub const fn start() -> Self {
        SourcePosition { line: 1, column: 0 }
    }

    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        SourcePosition { line, column }
    }

    /// Move to the start of the next line.
    #[inline]
    pub fn increment_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    #[inline]
    pub fn increment_column(&mut self) {
        self.column += 1;
    }

    /// Saturating decrement; column never goes below 0.
    #[inline]
    pub fn decrement_column(&mut self) {
        self.column = self.column.saturating_sub(1);
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The span covered by one token or diagnostic.
///
/// Invariant: `begin <= end` lexicographically (line, then column).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SourceRange {
    pub begin: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    #[inline]
    pub const fn new(begin: SourcePosition, end: SourcePosition) -> Self {
        SourceRange { begin, end }
    }

    /// Zero-width range at a single position.
    #[inline]
    pub const fn point(pos: SourcePosition) -> Self {
        SourceRange {
            begin: pos,
            end: pos,
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin == self.end {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}-{}", self.begin, self.end)
        }
    }
}

/// A range within a specific registered file.
///
/// Created fresh for every token; cheap value type. File name and path are
/// resolved through the `SourceManager` when rendering diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SourceLocation {
    pub file: FileId,
    pub range: SourceRange,
}

impl SourceLocation {
    #[inline]
    pub const fn new(file: FileId, range: SourceRange) -> Self {
        SourceLocation { file, range }
    }

    #[inline]
    pub const fn point(file: FileId, pos: SourcePosition) -> Self {
        SourceLocation {
            file,
            range: SourceRange::point(pos),
        }
    }
}

crate::static_assert_size!(SourcePosition, 8);
crate::static_assert_size!(SourceRange, 16);
crate::static_assert_size!(SourceLocation, 20);
