use super::{DirEntry, FileMetadata, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<Vec<u8>>,
    pub file_type: FileType,
}

/// In-memory [`FileSystem`] for tests
///
/// Relative paths are resolved against the mock root (`/mock` by default).
/// Individual paths can be marked as failing on read or write to simulate
/// permission problems.
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    failing_reads: RwLock<HashSet<PathBuf>>,
    failing_writes: RwLock<HashSet<PathBuf>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            failing_reads: RwLock::new(HashSet::new()),
            failing_writes: RwLock::new(HashSet::new()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.add_bytes(path, content.as_bytes());
    }

    pub fn add_bytes(&self, path: impl AsRef<Path>, content: &[u8]) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            self.ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_vec()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        self.ensure_parents(&mut files, &path);
    }

    /// Make every subsequent read of `path` fail
    pub fn fail_reads(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.failing_reads.write().unwrap().insert(path);
    }

    /// Make every subsequent write (or copy) targeting `path` fail
    pub fn fail_writes(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.failing_writes.write().unwrap().insert(path);
    }

    /// Returns the contents of a file as UTF-8, if it exists
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.normalize_path(path.as_ref());
        self.files
            .read()
            .unwrap()
            .get(&path)
            .and_then(|e| e.content.as_ref())
            .map(|c| String::from_utf8_lossy(c).into_owned())
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(&self, files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if !files.contains_key(&current) {
                files.insert(
                    current.clone(),
                    MockEntry {
                        content: None,
                        file_type: FileType::Directory,
                    },
                );
            }
        }
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if self.failing_writes.read().unwrap().contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        let files = self.files.read().unwrap();
        match path.parent() {
            Some(parent) if files.get(parent).map(|e| e.file_type) == Some(FileType::Directory) => {
                Ok(())
            }
            _ => Err(anyhow!("Parent directory not found: {:?}", path)),
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files.read().unwrap().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("Path not found: {:?}", path))?;

        Ok(FileMetadata {
            size: entry.content.as_ref().map(|c| c.len() as u64).unwrap_or(0),
            file_type: entry.file_type,
        })
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = self.normalize_path(path);
        if self.failing_reads.read().unwrap().contains(&path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }

        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        if self.failing_reads.read().unwrap().contains(&path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }

        let files = self.files.read().unwrap();
        match files.get(&path) {
            Some(entry) if entry.file_type == FileType::Directory => {}
            Some(_) => return Err(anyhow!("Not a directory: {:?}", path)),
            None => return Err(anyhow!("Directory not found: {:?}", path)),
        }

        let mut entries = Vec::new();
        for (file_path, entry) in files.iter() {
            if file_path.parent() == Some(path.as_path()) && file_path != &path {
                let name = file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string();

                entries.push(DirEntry {
                    path: file_path.clone(),
                    name,
                    file_type: entry.file_type,
                });
            }
        }

        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        if self.failing_writes.read().unwrap().contains(&path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        let mut files = self.files.write().unwrap();
        if files.get(&path).map(|e| e.file_type) == Some(FileType::File) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        self.ensure_parents(&mut files, &path);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let path = self.normalize_path(path);
        self.check_writable(&path)?;

        self.files.write().unwrap().insert(
            path,
            MockEntry {
                content: Some(contents.to_vec()),
                file_type: FileType::File,
            },
        );
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let content = self.read(from)?;
        let len = content.len() as u64;
        self.write(to, &content)?;
        Ok(len)
    }
}
