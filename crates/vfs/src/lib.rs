//! In-memory, path-normalized byte store used as the root of module
//! resolution. See `VirtualFileSystem` for the contract every resolver
//! stage is written against; `InMemoryFileSystem` and `DiskBackedFileSystem`
//! are the two platform backends a session can select at init.

mod path;

pub use path::VirtualPath;

use bytes::Bytes;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A single immutable-after-insertion entry in the virtual filesystem.
#[derive(Debug, Clone)]
pub struct VirtualFile {
  pub path: VirtualPath,
  pub bytes: Bytes,
  pub etag: Option<String>,
}

impl VirtualFile {
  pub fn new(path: VirtualPath, bytes: impl Into<Bytes>) -> Self {
    Self { path, bytes: bytes.into(), etag: None }
  }

  pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
    self.etag = Some(etag.into());
    self
  }
}

#[derive(Debug, Error)]
pub enum VfsError {
  #[error("no such file in virtual filesystem: {0}")]
  NotFound(VirtualPath),
  #[error("path escapes filesystem root: {0}")]
  InvalidPath(String),
  #[error("file is not valid UTF-8: {0}")]
  NotUtf8(VirtualPath),
  #[error("disk io error for {path}: {source}")]
  Io { path: VirtualPath, #[source] source: std::io::Error },
}

impl VfsError {
  pub fn kind(&self) -> &'static str {
    match self {
      VfsError::NotFound(_) => "NotFound",
      VfsError::InvalidPath(_) => "InvalidPath",
      VfsError::NotUtf8(_) => "NotUtf8",
      VfsError::Io { .. } => "Io",
    }
  }
}

/// Contract every resolver stage and the tarball mount service are written
/// against. Object-safe so a session can hold `Arc<dyn VirtualFileSystem>`
/// and swap backends without the resolver chain knowing the difference.
pub trait VirtualFileSystem: Send + Sync + std::fmt::Debug {
  fn read(&self, path: &VirtualPath) -> Result<Bytes, VfsError>;

  fn read_string(&self, path: &VirtualPath) -> Result<String, VfsError> {
    let bytes = self.read(path)?;
    String::from_utf8(bytes.to_vec())
      .map_err(|_| VfsError::NotUtf8(path.clone()))
  }

  fn write(&self, path: &VirtualPath, bytes: impl Into<Bytes>) -> Result<(), VfsError>
  where
    Self: Sized,
  {
    self.write_dyn(path, bytes.into())
  }

  /// Object-safe variant of `write`; implementors provide this one.
  fn write_dyn(&self, path: &VirtualPath, bytes: Bytes) -> Result<(), VfsError>;

  fn exists(&self, path: &VirtualPath) -> bool;

  fn clear(&self);

  /// Enumerates every path currently stored whose string form starts with
  /// `prefix`. Returned as an owned `Vec` rather than an iterator so the
  /// trait stays object-safe.
  fn list_by_prefix(&self, prefix: &VirtualPath) -> Vec<VirtualPath>;
}

/// Backend 1: a single hash table, paths compared byte-exact after
/// normalization. Nothing is evicted implicitly; `clear()` is the only way
/// entries disappear mid-process.
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
  files: DashMap<VirtualPath, VirtualFile>,
}

impl InMemoryFileSystem {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn with_files(files: impl IntoIterator<Item = VirtualFile>) -> Arc<Self> {
    let map = DashMap::new();
    for file in files {
      map.insert(file.path.clone(), file);
    }
    Arc::new(Self { files: map })
  }
}

impl VirtualFileSystem for InMemoryFileSystem {
  fn read(&self, path: &VirtualPath) -> Result<Bytes, VfsError> {
    self
      .files
      .get(path)
      .map(|f| f.bytes.clone())
      .ok_or_else(|| VfsError::NotFound(path.clone()))
  }

  fn write_dyn(&self, path: &VirtualPath, bytes: Bytes) -> Result<(), VfsError> {
    log::debug!("vfs: write {} ({} bytes)", path, bytes.len());
    self.files.insert(path.clone(), VirtualFile::new(path.clone(), bytes));
    Ok(())
  }

  fn exists(&self, path: &VirtualPath) -> bool {
    self.files.contains_key(path)
  }

  fn clear(&self) {
    self.files.clear();
  }

  fn list_by_prefix(&self, prefix: &VirtualPath) -> Vec<VirtualPath> {
    self
      .files
      .iter()
      .map(|e| e.key().clone())
      .filter(|p| p.as_str().starts_with(prefix.as_str()))
      .collect()
  }
}

/// Backend 2: host-filesystem-backed (e.g. OPFS in a worker, or a plain
/// directory when running under Node/Deno/Bun). Writes are durable within
/// the process; the `VirtualPath` is joined onto `root` to get the real
/// on-disk path.
#[derive(Debug)]
pub struct DiskBackedFileSystem {
  root: PathBuf,
}

impl DiskBackedFileSystem {
  pub fn new(root: impl Into<PathBuf>) -> Arc<Self> {
    Arc::new(Self { root: root.into() })
  }

  fn real_path(&self, path: &VirtualPath) -> PathBuf {
    // `path` is always rooted at `/`; strip it so `join` doesn't treat it
    // as an absolute override of `self.root`.
    self.root.join(path.as_str().trim_start_matches('/'))
  }
}

impl VirtualFileSystem for DiskBackedFileSystem {
  fn read(&self, path: &VirtualPath) -> Result<Bytes, VfsError> {
    let real = self.real_path(path);
    match std::fs::read(&real) {
      Ok(bytes) => Ok(Bytes::from(bytes)),
      Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
        Err(VfsError::NotFound(path.clone()))
      }
      Err(source) => Err(VfsError::Io { path: path.clone(), source }),
    }
  }

  fn write_dyn(&self, path: &VirtualPath, bytes: Bytes) -> Result<(), VfsError> {
    let real = self.real_path(path);
    if let Some(parent) = real.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|source| VfsError::Io { path: path.clone(), source })?;
    }
    std::fs::write(&real, &bytes)
      .map_err(|source| VfsError::Io { path: path.clone(), source })
  }

  fn exists(&self, path: &VirtualPath) -> bool {
    self.real_path(path).exists()
  }

  fn clear(&self) {
    let _ = std::fs::remove_dir_all(&self.root);
    let _ = std::fs::create_dir_all(&self.root);
  }

  fn list_by_prefix(&self, prefix: &VirtualPath) -> Vec<VirtualPath> {
    walk_dir_paths(&self.root)
      .into_iter()
      .filter(|p| p.as_str().starts_with(prefix.as_str()))
      .collect()
  }
}

fn walk_dir_paths(root: &std::path::Path) -> Vec<VirtualPath> {
  let mut out = Vec::new();
  let mut stack = vec![root.to_path_buf()];
  while let Some(dir) = stack.pop() {
    let Ok(entries) = std::fs::read_dir(&dir) else { continue };
    for entry in entries.flatten() {
      let path = entry.path();
      if path.is_dir() {
        stack.push(path);
      } else if let Ok(rel) = path.strip_prefix(root) {
        let virt = format!("/{}", rel.to_string_lossy().replace('\\', "/"));
        if let Ok(vp) = VirtualPath::new(&virt) {
          out.push(vp);
        }
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn write_then_read_roundtrips() {
    let fs = InMemoryFileSystem::new();
    let p = VirtualPath::new("/a.tsx").unwrap();
    fs.write_dyn(&p, Bytes::from_static(b"export const x = 1;")).unwrap();
    assert_eq!(fs.read(&p).unwrap(), Bytes::from_static(b"export const x = 1;"));
  }

  #[test]
  fn missing_file_is_not_found() {
    let fs = InMemoryFileSystem::new();
    let p = VirtualPath::new("/missing.ts").unwrap();
    let err = fs.read(&p).unwrap_err();
    assert_eq!(err.kind(), "NotFound");
  }

  #[test]
  fn list_by_prefix_filters_to_root() {
    let fs = InMemoryFileSystem::new();
    fs.write_dyn(&VirtualPath::new("/node_modules/a@1.0.0/index.js").unwrap(), Bytes::from_static(b"1")).unwrap();
    fs.write_dyn(&VirtualPath::new("/node_modules/b@1.0.0/index.js").unwrap(), Bytes::from_static(b"2")).unwrap();
    fs.write_dyn(&VirtualPath::new("/index.tsx").unwrap(), Bytes::from_static(b"3")).unwrap();
    let prefix = VirtualPath::new("/node_modules/a@1.0.0").unwrap();
    let found = fs.list_by_prefix(&prefix);
    assert_eq!(found.len(), 1);
  }

  #[test]
  fn clear_removes_everything() {
    let fs = InMemoryFileSystem::new();
    fs.write_dyn(&VirtualPath::new("/a.ts").unwrap(), Bytes::from_static(b"1")).unwrap();
    fs.clear();
    assert!(!fs.exists(&VirtualPath::new("/a.ts").unwrap()));
  }
}
