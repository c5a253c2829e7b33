//! File access broker for the compiler.
//!
//! Owns a concatenating-overlay VFS seeded with an in-memory base layer.
//! System module paths push real directories on top; a path defined in
//! several layers reads back as the newline-joined concatenation of all of
//! them (bottom layer first).

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::vfs::{
    ConcatenatedOverlayFileSystem, FileStatus, FileSystem, InMemoryFileSystem, RealFileSystem,
};

pub struct FileManager {
    memory: Arc<InMemoryFileSystem>,
    vfs: ConcatenatedOverlayFileSystem,
}

impl FileManager {
    pub fn new() -> Self {
        let memory = Arc::new(InMemoryFileSystem::new());
        let vfs = ConcatenatedOverlayFileSystem::new(Arc::clone(&memory) as Arc<dyn FileSystem>);
        FileManager { memory, vfs }
    }

    /// Mount real directories as VFS layers, in order (first path is the
    /// bottom-most of the new layers).
    pub fn set_system_module_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.vfs
                .push_layer(Arc::new(RealFileSystem::new(path.clone())));
        }
    }

    /// Add a file to the in-memory base layer (REPL input, generated stubs).
    pub fn add_memory_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.memory.add_file(path, contents);
    }

    pub fn exists(&self, path: &str) -> bool {
        self.vfs.exists(path)
    }

    pub fn status(&self, path: &str) -> io::Result<FileStatus> {
        self.vfs.status(path)
    }

    /// Full (possibly concatenated) contents of a file.
    pub fn buffer_for_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.vfs.open(path)
    }

    pub fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        self.vfs.read_dir(path)
    }
}

impl Default for FileManager {
    fn default() -> Self {
        FileManager::new()
    }
}
