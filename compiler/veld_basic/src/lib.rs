//! Veld Basic - Source and Token Foundations
//!
//! This crate contains the leaf data structures shared by every stage of the
//! Veld compiler:
//! - Positions, ranges, and locations for source text
//! - The `Source` capability trait with file/string/buffer backings
//! - The token-kind catalog with keyword and punctuator tables
//! - `SourceManager` and per-file line stores for diagnostic context
//! - The virtual file system (overlay / concatenating overlay) and
//!   `FileManager`
//!
//! # Design Philosophy
//!
//! - **One table to rule them**: token kinds, spellings, keyword lookup, and
//!   punctuator lookup all derive from a single declarative list
//! - **Compact handles**: files are `FileId(u32)`, locations are plain `Copy`
//!   values; display strings are resolved through the `SourceManager`
//! - **One decode core**: all `Source` backings share the same BOM-skip,
//!   carriage-return-collapse, and deferred-newline position tracking

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod file_manager;
mod source;
mod source_location;
mod source_manager;
mod token;
pub mod vfs;

pub use file_manager::FileManager;
pub use source::{BufferSource, FileSource, Source, SourceError, StringSource};
pub use source_location::{FileId, SourceLocation, SourcePosition, SourceRange};
pub use source_manager::{FileInfo, SourceManager};
pub use token::{
    IdentifierInfo, IdentifierTable, PunctuatorInfo, PunctuatorTable, Token, TokenClass,
    TokenEntry, TokenKind, TokenValue, TOKEN_TABLE,
};
