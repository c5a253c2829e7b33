//! Virtual file system layers.
//!
//! Module resolution sees one logical tree assembled from several mounted
//! layers: an in-memory base (REPL input, generated stubs), plus real
//! directories pushed for each system module path. Two composition modes:
//!
//! - [`OverlayFileSystem`] resolves a path to the top-most layer that has it.
//! - [`ConcatenatedOverlayFileSystem`] resolves `open` to the concatenation
//!   of *every* layer's content for that path, bottom layer first, joined
//!   with newlines. Module paths may each define fragments of the same
//!   logical file; the compiler sees them as one.
//!
//! Paths are virtual, absolute, and `/`-separated regardless of host OS.

use std::hash::{Hash, Hasher};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

/// What kind of entry a path resolves to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FileKind {
    File,
    Directory,
}

/// Result of a `status` query.
#[derive(Clone, Debug)]
pub struct FileStatus {
    pub name: String,
    pub kind: FileKind,
    pub size: u64,
    /// Stable identity distinguishing files with identical names that live
    /// in different layers.
    pub unique_id: u64,
}

impl FileStatus {
    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

/// Minimal file-system capability consumed by the `FileManager`.
pub trait FileSystem: Send + Sync {
    fn status(&self, path: &str) -> io::Result<FileStatus>;

    fn exists(&self, path: &str) -> bool {
        self.status(path).is_ok()
    }

    /// Read the full contents of a file.
    fn open(&self, path: &str) -> io::Result<Vec<u8>>;

    /// List the immediate children of a directory, as virtual paths.
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such path: {path}"))
}

fn hash_id(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Normalize a virtual directory path so prefix checks work uniformly.
fn dir_prefix(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("{trimmed}/")
    }
}

struct MemoryInner {
    files: FxHashMap<String, (u64, Vec<u8>)>,
    next_id: u64,
}

/// Writable in-memory tree, used as the bottom layer of the manager's VFS.
pub struct InMemoryFileSystem {
    inner: RwLock<MemoryInner>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        InMemoryFileSystem {
            inner: RwLock::new(MemoryInner {
                files: FxHashMap::default(),
                next_id: 1,
            }),
        }
    }

    pub fn add_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.files.insert(path.to_string(), (id, contents.into()));
    }
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        InMemoryFileSystem::new()
    }
}

impl FileSystem for InMemoryFileSystem {
    fn status(&self, path: &str) -> io::Result<FileStatus> {
        let inner = self.inner.read();
        if let Some((id, contents)) = inner.files.get(path) {
            return Ok(FileStatus {
                name: path.to_string(),
                kind: FileKind::File,
                size: contents.len() as u64,
                unique_id: *id,
            });
        }
        let prefix = dir_prefix(path);
        if inner.files.keys().any(|k| k.starts_with(&prefix)) {
            return Ok(FileStatus {
                name: path.trim_end_matches('/').to_string(),
                kind: FileKind::Directory,
                size: 0,
                unique_id: hash_id(path),
            });
        }
        Err(not_found(path))
    }

    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        let inner = self.inner.read();
        inner
            .files
            .get(path)
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| not_found(path))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let inner = self.inner.read();
        let prefix = dir_prefix(path);
        let mut children: Vec<String> = inner
            .files
            .keys()
            .filter_map(|k| {
                let rest = k.strip_prefix(&prefix)?;
                let child = rest.split('/').next()?;
                Some(format!("{prefix}{child}"))
            })
            .collect();
        children.sort();
        children.dedup();
        // Empty directories cannot exist in this model, so no children
        // means the path is either a file or absent.
        if children.is_empty() {
            return Err(not_found(path));
        }
        Ok(children)
    }
}

/// A real directory mounted at the virtual root.
///
/// The virtual path `/b/1/test.txt` resolves to `<root>/b/1/test.txt`.
pub struct RealFileSystem {
    root: PathBuf,
}

impl RealFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RealFileSystem { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl FileSystem for RealFileSystem {
    fn status(&self, path: &str) -> io::Result<FileStatus> {
        let real = self.resolve(path);
        let meta = std::fs::metadata(&real)?;
        Ok(FileStatus {
            name: path.trim_end_matches('/').to_string(),
            kind: if meta.is_dir() {
                FileKind::Directory
            } else {
                FileKind::File
            },
            size: meta.len(),
            unique_id: hash_id(&real.display().to_string()),
        })
    }

    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let prefix = dir_prefix(path);
        let mut children = Vec::new();
        for entry in std::fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            children.push(format!(
                "{prefix}{}",
                entry.file_name().to_string_lossy()
            ));
        }
        children.sort();
        Ok(children)
    }
}

fn union_read_dir(layers: &[Arc<dyn FileSystem>], path: &str) -> io::Result<Vec<String>> {
    let mut children = Vec::new();
    let mut any = false;
    for layer in layers {
        if let Ok(mut entries) = layer.read_dir(path) {
            any = true;
            children.append(&mut entries);
        }
    }
    if !any {
        return Err(not_found(path));
    }
    children.sort();
    children.dedup();
    Ok(children)
}

/// Layer stack where the top-most layer that has a path wins.
pub struct OverlayFileSystem {
    /// Bottom first; `push_layer` appends on top.
    layers: Vec<Arc<dyn FileSystem>>,
}

impl OverlayFileSystem {
    pub fn new(base: Arc<dyn FileSystem>) -> Self {
        OverlayFileSystem { layers: vec![base] }
    }

    pub fn push_layer(&mut self, layer: Arc<dyn FileSystem>) {
        self.layers.push(layer);
    }
}

impl FileSystem for OverlayFileSystem {
    fn status(&self, path: &str) -> io::Result<FileStatus> {
        for layer in self.layers.iter().rev() {
            if let Ok(status) = layer.status(path) {
                return Ok(status);
            }
        }
        Err(not_found(path))
    }

    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        for layer in self.layers.iter().rev() {
            if let Ok(contents) = layer.open(path) {
                return Ok(contents);
            }
        }
        Err(not_found(path))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        union_read_dir(&self.layers, path)
    }
}

/// Layer stack where `open` concatenates every layer's content for the
/// path, bottom layer first, newline-joined.
pub struct ConcatenatedOverlayFileSystem {
    /// Bottom first; `push_layer` appends on top.
    layers: Vec<Arc<dyn FileSystem>>,
}

impl ConcatenatedOverlayFileSystem {
    pub fn new(base: Arc<dyn FileSystem>) -> Self {
        ConcatenatedOverlayFileSystem { layers: vec![base] }
    }

    pub fn push_layer(&mut self, layer: Arc<dyn FileSystem>) {
        self.layers.push(layer);
    }
}

impl FileSystem for ConcatenatedOverlayFileSystem {
    fn status(&self, path: &str) -> io::Result<FileStatus> {
        for layer in self.layers.iter().rev() {
            if let Ok(status) = layer.status(path) {
                return Ok(status);
            }
        }
        Err(not_found(path))
    }

    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        let mut joined = Vec::new();
        let mut any = false;
        for layer in &self.layers {
            if let Ok(contents) = layer.open(path) {
                any = true;
                joined.extend_from_slice(&contents);
                if !joined.ends_with(b"\n") {
                    joined.push(b'\n');
                }
            }
        }
        if !any {
            return Err(not_found(path));
        }
        Ok(joined)
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        union_read_dir(&self.layers, path)
    }
}
