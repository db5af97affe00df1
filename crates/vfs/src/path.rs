use crate::VfsError;
use std::fmt;

/// An absolute, POSIX-style, normalized path: single leading `/`, no `.` or
/// `..` segments, separators collapsed. Two `VirtualPath`s compare equal iff
/// their normalized string forms are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualPath(String);

impl VirtualPath {
  /// Normalizes `raw` and constructs a `VirtualPath`. Fails if a `..`
  /// segment would escape the root.
  pub fn new(raw: &str) -> Result<Self, VfsError> {
    Ok(Self(normalize(raw)?))
  }

  /// Joins `specifier` onto this path's parent directory, the way a relative
  /// import specifier resolves against its importer. `specifier` may itself
  /// be absolute, in which case it replaces `self` entirely.
  pub fn join(&self, specifier: &str) -> Result<Self, VfsError> {
    if specifier.starts_with('/') {
      return Self::new(specifier);
    }
    let parent = match self.0.rfind('/') {
      Some(idx) => &self.0[..idx],
      None => "",
    };
    Self::new(&format!("{parent}/{specifier}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }

  /// True if `self` is `other` or a descendant of `other` (prefix match on
  /// path segments, not raw strings — `/node_modules/ab` is not under
  /// `/node_modules/a`).
  pub fn is_under(&self, other: &VirtualPath) -> bool {
    if self.0 == other.0 {
      return true;
    }
    let prefix = if other.0 == "/" { "/".to_string() } else { format!("{}/", other.0) };
    self.0.starts_with(&prefix)
  }

  pub fn extension(&self) -> Option<&str> {
    let last_segment = self.0.rsplit('/').next().unwrap_or("");
    last_segment.rfind('.').map(|idx| &last_segment[idx..])
  }
}

impl fmt::Display for VirtualPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl AsRef<str> for VirtualPath {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

/// Collapses `//`, resolves `.` and `..` segments, and enforces a single
/// leading `/`. A `..` that would walk above the root is an error rather
/// than being clamped, since silently clamping would make two different
/// inputs collide on the same normalized path.
fn normalize(raw: &str) -> Result<String, VfsError> {
  let mut segments: Vec<&str> = Vec::new();
  for segment in raw.split('/') {
    match segment {
      "" | "." => continue,
      ".." => {
        if segments.pop().is_none() {
          return Err(VfsError::InvalidPath(raw.to_string()));
        }
      }
      other => segments.push(other),
    }
  }
  if segments.is_empty() {
    return Ok("/".to_string());
  }
  Ok(format!("/{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_dot_segments() {
    assert_eq!(VirtualPath::new("/a/./b/../c").unwrap().as_str(), "/a/c");
  }

  #[test]
  fn collapses_duplicate_slashes() {
    assert_eq!(VirtualPath::new("//a//b").unwrap().as_str(), "/a/b");
  }

  #[test]
  fn root_normalizes_to_single_slash() {
    assert_eq!(VirtualPath::new("").unwrap().as_str(), "/");
    assert_eq!(VirtualPath::new("/").unwrap().as_str(), "/");
  }

  #[test]
  fn escaping_root_is_an_error() {
    assert!(VirtualPath::new("/../a").is_err());
  }

  #[test]
  fn normalize_is_idempotent() {
    let once = VirtualPath::new("/a/./b/../c//d").unwrap();
    let twice = VirtualPath::new(once.as_str()).unwrap();
    assert_eq!(once, twice);
  }

  #[test]
  fn join_relative_specifier() {
    let importer = VirtualPath::new("/src/a.ts").unwrap();
    assert_eq!(importer.join("./b.ts").unwrap().as_str(), "/src/b.ts");
    assert_eq!(importer.join("../b.ts").unwrap().as_str(), "/b.ts");
  }

  #[test]
  fn join_absolute_specifier_replaces() {
    let importer = VirtualPath::new("/src/a.ts").unwrap();
    assert_eq!(importer.join("/other.ts").unwrap().as_str(), "/other.ts");
  }

  #[test]
  fn is_under_respects_segment_boundaries() {
    let root = VirtualPath::new("/node_modules/a@1.0.0").unwrap();
    assert!(VirtualPath::new("/node_modules/a@1.0.0/index.js").unwrap().is_under(&root));
    assert!(!VirtualPath::new("/node_modules/ab@1.0.0/index.js").unwrap().is_under(&root));
  }
}
