//! Per-file line stores and the manager that owns them.
//!
//! The lexer mirrors every character it reads into the owning file's
//! `FileInfo` so diagnostics can later echo the originating source line.
//! Files are keyed by the (identity, name, path) triple: identical names in
//! different overlay layers stay distinct through the VFS identity.

use rustc_hash::FxHashMap;

use crate::file_manager::FileManager;
use crate::source::{BufferSource, Source, SourceError};
use crate::source_location::{FileId, SourcePosition};

/// Accumulated per-line code points for one file.
///
/// Lines are 1-based and only ever grow; the store holds exactly what the
/// lexer has read so far.
pub struct FileInfo {
    name: String,
    path: String,
    identity: Option<u64>,
    lines: Vec<Vec<u32>>,
}

impl FileInfo {
    fn new(identity: Option<u64>, name: String, path: String) -> Self {
        FileInfo {
            name,
            path,
            identity,
            lines: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn identity(&self) -> Option<u64> {
        self.identity
    }

    /// Append a code point to the line `pos.line`, growing the store as
    /// needed. Never truncates.
    pub fn add_character(&mut self, pos: SourcePosition, ch: char) {
        debug_assert!(pos.line >= 1, "lines are 1-based");
        let line = pos.line as usize;
        while self.lines.len() < line {
            self.lines.push(Vec::new());
        }
        self.lines[line - 1].push(ch as u32);
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Stored code points of a 1-based line.
    ///
    /// Out-of-range lines are a precondition violation.
    pub fn line(&self, n: u32) -> &[u32] {
        assert!(
            n >= 1 && (n as usize) <= self.lines.len(),
            "line {n} out of range (file has {} lines)",
            self.lines.len()
        );
        &self.lines[n as usize - 1]
    }

    /// Re-encode a stored line for diagnostic display.
    pub fn line_to_string(&self, n: u32) -> String {
        self.line(n)
            .iter()
            .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

/// Owns every `FileInfo` and brokers file access through the `FileManager`.
pub struct SourceManager {
    files: Vec<FileInfo>,
    index: FxHashMap<(Option<u64>, String, String), FileId>,
    file_manager: FileManager,
}

impl SourceManager {
    pub fn new() -> Self {
        SourceManager::with_file_manager(FileManager::new())
    }

    pub fn with_file_manager(file_manager: FileManager) -> Self {
        SourceManager {
            files: Vec::new(),
            index: FxHashMap::default(),
            file_manager,
        }
    }

    pub fn file_manager(&self) -> &FileManager {
        &self.file_manager
    }

    pub fn file_manager_mut(&mut self) -> &mut FileManager {
        &mut self.file_manager
    }

    /// Idempotent lookup-or-create keyed by (identity, name, path).
    pub fn get_or_insert_file_info(
        &mut self,
        identity: Option<u64>,
        name: &str,
        path: &str,
    ) -> FileId {
        let key = (identity, name.to_string(), path.to_string());
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = FileId(u32::try_from(self.files.len()).unwrap_or(u32::MAX));
        self.files
            .push(FileInfo::new(identity, name.to_string(), path.to_string()));
        self.index.insert(key, id);
        id
    }

    /// Register a source's identity triple, returning its handle.
    pub fn register_source(&mut self, source: &dyn Source) -> FileId {
        let name = source.name().to_string();
        let path = source.path().to_string();
        self.get_or_insert_file_info(source.identity(), &name, &path)
    }

    pub fn file_info(&self, id: FileId) -> &FileInfo {
        &self.files[id.0 as usize]
    }

    pub fn file_info_mut(&mut self, id: FileId) -> &mut FileInfo {
        &mut self.files[id.0 as usize]
    }

    /// Resolve a path through the VFS and wrap the bytes as a `Source`
    /// tagged with the VFS-provided identity.
    pub fn get_file(&mut self, path: &str) -> Result<BufferSource, SourceError> {
        let wrap = |source| SourceError::Read {
            path: path.to_string(),
            source,
        };
        let status = self.file_manager.status(path).map_err(wrap)?;
        let bytes = self.file_manager.buffer_for_file(path).map_err(wrap)?;
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Ok(BufferSource::new(name, path, status.unique_id, &bytes))
    }
}

impl Default for SourceManager {
    fn default() -> Self {
        SourceManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // === FileInfo ===

    #[test]
    fn add_character_grows_lines() {
        let mut info = FileInfo::new(None, "t".into(), "/t".into());
        info.add_character(SourcePosition::new(1, 1), 'h');
        info.add_character(SourcePosition::new(1, 2), 'i');
        info.add_character(SourcePosition::new(3, 1), '!');

        assert_eq!(info.num_lines(), 3);
        assert_eq!(info.line_to_string(1), "hi");
        assert_eq!(info.line_to_string(2), "");
        assert_eq!(info.line_to_string(3), "!");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_line_panics() {
        let info = FileInfo::new(None, "t".into(), "/t".into());
        let _ = info.line(1);
    }

    // === SourceManager ===

    #[test]
    fn get_or_insert_is_idempotent() {
        let mut sm = SourceManager::new();
        let a = sm.get_or_insert_file_info(Some(1), "m.veld", "/m.veld");
        let b = sm.get_or_insert_file_info(Some(1), "m.veld", "/m.veld");
        assert_eq!(a, b);

        // Same name/path but a different layer identity is a new file.
        let c = sm.get_or_insert_file_info(Some(2), "m.veld", "/m.veld");
        assert_ne!(a, c);
    }

    #[test]
    fn get_file_wraps_vfs_buffer_with_identity() {
        let mut sm = SourceManager::new();
        sm.file_manager()
            .add_memory_file("/mod/a.veld", "fn".as_bytes().to_vec());

        let source = sm.get_file("/mod/a.veld").unwrap();
        assert_eq!(source.name(), "a.veld");
        assert_eq!(source.path(), "/mod/a.veld");
        assert!(source.identity().is_some());

        assert!(sm.get_file("/missing.veld").is_err());
    }

    #[test]
    fn register_source_uses_identity_triple() {
        let mut sm = SourceManager::new();
        sm.file_manager()
            .add_memory_file("/x.veld", "a".as_bytes().to_vec());
        let src = sm.get_file("/x.veld").unwrap();

        let id = sm.register_source(&src);
        let again = sm.register_source(&src);
        assert_eq!(id, again);
        assert_eq!(sm.file_info(id).name(), "x.veld");
    }
}
