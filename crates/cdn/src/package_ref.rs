use crate::CdnError;
use std::fmt;

/// An npm package name, optionally scoped (`@scope/name`). Validated against
/// the same shape npm itself enforces: lowercase-ish, no leading dot or
/// underscore, no URL-unsafe characters — enforced loosely here since the
/// orchestrator is a consumer of names the registry already accepted, not a
/// publish-time validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName {
  pub scope: Option<String>,
  pub name: String,
}

impl PackageName {
  pub fn parse(input: &str) -> Result<Self, CdnError> {
    if input.is_empty() {
      return Err(CdnError::InvalidSpec(input.to_string()));
    }
    if let Some(rest) = input.strip_prefix('@') {
      let (scope, name) = rest
        .split_once('/')
        .ok_or_else(|| CdnError::InvalidSpec(input.to_string()))?;
      if scope.is_empty() || name.is_empty() {
        return Err(CdnError::InvalidSpec(input.to_string()));
      }
      Ok(Self { scope: Some(scope.to_string()), name: name.to_string() })
    } else {
      if input.starts_with('.') || input.starts_with('_') || input.contains(' ') {
        return Err(CdnError::InvalidSpec(input.to_string()));
      }
      Ok(Self { scope: None, name: input.to_string() })
    }
  }
}

impl fmt::Display for PackageName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.scope {
      Some(scope) => write!(f, "@{scope}/{}", self.name),
      None => write!(f, "{}", self.name),
    }
  }
}

/// `{ name, rangeOrVersion, subpath }`. `subpath` is always present — empty
/// string means the package root (`spec.md` §3 calls it optional but then
/// defines the empty string as the root sentinel, so we model it as a plain
/// `String` rather than `Option<String>`; see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
  pub name: PackageName,
  pub range_or_version: String,
  pub subpath: String,
}

impl PackageRef {
  /// Splits a bare specifier (`lodash`, `@babel/core`, `lodash/map`,
  /// `@babel/core/lib/index.js`) into `(name, subpath)` using npm rules:
  /// the first segment is the name unless it starts with `@`, in which case
  /// the first two segments are the name.
  pub fn split_bare_specifier(specifier: &str) -> Result<(PackageName, String), CdnError> {
    let mut parts = specifier.splitn(if specifier.starts_with('@') { 3 } else { 2 }, '/');
    let name_str = if specifier.starts_with('@') {
      let scope = parts.next().ok_or_else(|| CdnError::InvalidSpec(specifier.to_string()))?;
      let name = parts.next().ok_or_else(|| CdnError::InvalidSpec(specifier.to_string()))?;
      format!("{scope}/{name}")
    } else {
      parts.next().ok_or_else(|| CdnError::InvalidSpec(specifier.to_string()))?.to_string()
    };
    let name = PackageName::parse(&name_str)?;
    let subpath = parts.next().unwrap_or("").to_string();
    Ok((name, subpath))
  }
}
