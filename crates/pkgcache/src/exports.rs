//! Package entry-point resolution: `exports` conditional map -> `module` ->
//! `main` -> `browser` -> fallback `index.js`. The conditional-exports
//! subset (`resolve_exports_subpath`, `pattern_key_compare`) is a direct
//! port of the algorithm in the teacher's `cli/compat/conditional_exports.rs`
//! — tie-breaks there are deliberately observable (longer literal prefix
//! wins over a `*` pattern; among two patterns, the one with the longer
//! prefix up to its first `*` wins), so we keep the same comparator instead
//! of re-deriving one that merely "looks right".

use crate::error::PackageError;
use crate::manifest::{PackageManifest, SideEffects};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
  Browser,
  Node,
}

#[derive(Debug, Clone)]
pub struct Conditions {
  pub list: Vec<&'static str>,
}

impl Conditions {
  pub fn for_platform(platform: Platform) -> Self {
    let list = match platform {
      Platform::Browser => vec!["browser", "module", "import", "default"],
      Platform::Node => vec!["node", "require", "default"],
    };
    Self { list }
  }
}

#[derive(Debug, Clone)]
pub struct ResolvedEntry {
  pub file: String,
  pub side_effects: Option<SideEffectsDecl>,
}

#[derive(Debug, Clone)]
pub enum SideEffectsDecl {
  Flag(bool),
  Globs(Vec<String>),
}

/// `resolveEntry(manifest, subpath, conditions) -> { file, sideEffects? }`.
/// `subpath` is the bare-specifier subpath with no leading `./` (empty
/// string means the package root).
pub fn resolve_entry(
  manifest: &PackageManifest,
  subpath: &str,
  conditions: &Conditions,
) -> Result<ResolvedEntry, PackageError> {
  let export_subpath = if subpath.is_empty() { ".".to_string() } else { format!("./{subpath}") };

  let file = if let Some(exports) = &manifest.exports {
    resolve_exports_subpath(exports, &export_subpath, &conditions.list).ok_or_else(|| {
      PackageError::SubpathNotExported {
        name: manifest.name.clone(),
        version: manifest.version.clone(),
        subpath: subpath.to_string(),
      }
    })?
  } else if !subpath.is_empty() {
    // No `exports` map: npm's legacy resolution only has an opinion about
    // the package root; deep subpaths resolve directly against the VFS/
    // tarball contents by the resolver chain, so hand the subpath back
    // untouched.
    subpath.to_string()
  } else if let Some(module) = &manifest.module {
    module.clone()
  } else if conditions.list.contains(&"browser") {
    match browser_field_main(manifest) {
      Some(file) => file,
      None => manifest.main.clone().unwrap_or_else(|| "index.js".to_string()),
    }
  } else if let Some(main) = &manifest.main {
    main.clone()
  } else {
    "index.js".to_string()
  };

  let side_effects = manifest.side_effects.as_ref().map(|se| match se {
    SideEffects::Flag(b) => SideEffectsDecl::Flag(*b),
    SideEffects::Globs(globs) => SideEffectsDecl::Globs(globs.clone()),
  });

  Ok(ResolvedEntry { file: file.trim_start_matches("./").to_string(), side_effects })
}

fn browser_field_main(manifest: &PackageManifest) -> Option<String> {
  match manifest.browser.as_ref()? {
    Value::String(s) => Some(s.clone()),
    Value::Object(map) => {
      let main = manifest.main.as_deref().unwrap_or("index.js");
      let candidates = [main.to_string(), format!("./{main}")];
      for candidate in candidates {
        if let Some(Value::String(replacement)) = map.get(&candidate) {
          return Some(replacement.clone());
        }
      }
      None
    }
    _ => None,
  }
}

/// Compares two pattern keys the way Node does: the key with the longer
/// literal prefix (everything before the first `*`) wins; ties broken by
/// the longer full key winning. Returns `Ordering`-style `-1/0/1` to match
/// the teacher's source shape directly.
fn pattern_key_compare(a: &str, b: &str) -> i32 {
  let a_star = a.find('*');
  let b_star = b.find('*');
  let base_len_a = a_star.map(|i| i + 1).unwrap_or(a.len());
  let base_len_b = b_star.map(|i| i + 1).unwrap_or(b.len());

  if base_len_a != base_len_b {
    return if base_len_a > base_len_b { -1 } else { 1 };
  }
  if a_star.is_none() {
    return 1;
  }
  if b_star.is_none() {
    return -1;
  }
  if a.len() != b.len() {
    return if a.len() > b.len() { -1 } else { 1 };
  }
  0
}

fn is_conditional_sugar(map: &serde_json::Map<String, Value>) -> bool {
  let mut is_sugar = None;
  for key in map.keys() {
    let cur = key.is_empty() || !key.starts_with('.');
    match is_sugar {
      None => is_sugar = Some(cur),
      Some(prev) if prev != cur => return false,
      _ => {}
    }
  }
  is_sugar.unwrap_or(false)
}

fn resolve_condition_value(value: &Value, conditions: &[&str]) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Null => None,
    Value::Object(map) => {
      for key in map.keys() {
        if key == "default" || conditions.contains(&key.as_str()) {
          if let Some(resolved) = resolve_condition_value(map.get(key).unwrap(), conditions) {
            return Some(resolved);
          }
        }
      }
      None
    }
    Value::Array(items) => items.iter().find_map(|item| resolve_condition_value(item, conditions)),
    _ => None,
  }
}

/// Resolves `subpath` (e.g. `.` or `./lib/index.js`) against an `exports`
/// value already known to be an object keyed by subpath pattern (the
/// "sugar" single-target/condition-object form is handled by the `.`
/// special case inside `is_conditional_sugar`).
pub fn resolve_exports_subpath(exports: &Value, subpath: &str, conditions: &[&str]) -> Option<String> {
  match exports {
    Value::String(_) | Value::Array(_) => {
      if subpath == "." {
        resolve_condition_value(exports, conditions)
      } else {
        None
      }
    }
    Value::Object(map) => {
      if is_conditional_sugar(map) {
        if subpath != "." {
          return None;
        }
        resolve_condition_value(exports, conditions)
      } else if let Some(exact) = map.get(subpath) {
        resolve_condition_value(exact, conditions)
      } else {
        let mut best: Option<&String> = None;
        for key in map.keys() {
          let Some(star) = key.find('*') else { continue };
          let (prefix, suffix) = (&key[..star], &key[star + 1..]);
          if subpath.len() >= key.len() - 1
            && subpath.starts_with(prefix)
            && subpath.ends_with(suffix)
          {
            best = match best {
              Some(b) if pattern_key_compare(key, b) >= 0 => Some(b),
              _ => Some(key),
            };
          }
        }
        let key = best?;
        let star = key.find('*').unwrap();
        let matched_len = subpath.len() - (key.len() - star - 1) - star;
        let matched = &subpath[star..star + matched_len];
        let target = map.get(key)?;
        let resolved = resolve_condition_value(target, conditions)?;
        Some(resolved.replacen('*', matched, 1))
      }
    }
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn manifest_with_exports(exports: Value) -> PackageManifest {
    serde_json::from_value(json!({
      "name": "pkg",
      "version": "1.0.0",
      "dist": { "tarball": "https://example.invalid/pkg-1.0.0.tgz" },
      "exports": exports,
    }))
    .unwrap()
  }

  #[test]
  fn resolves_root_from_sugar_string() {
    let m = manifest_with_exports(json!("./index.js"));
    let resolved = resolve_entry(&m, "", &Conditions::for_platform(Platform::Browser)).unwrap();
    assert_eq!(resolved.file, "index.js");
  }

  #[test]
  fn resolves_condition_object() {
    let m = manifest_with_exports(json!({
      "browser": "./browser.js",
      "default": "./index.js",
    }));
    let resolved = resolve_entry(&m, "", &Conditions::for_platform(Platform::Browser)).unwrap();
    assert_eq!(resolved.file, "browser.js");
    let resolved_node = resolve_entry(&m, "", &Conditions::for_platform(Platform::Node)).unwrap();
    assert_eq!(resolved_node.file, "index.js");
  }

  #[test]
  fn resolves_subpath_map() {
    let m = manifest_with_exports(json!({
      ".": "./index.js",
      "./feature": "./feature.js",
    }));
    let resolved = resolve_entry(&m, "feature", &Conditions::for_platform(Platform::Node)).unwrap();
    assert_eq!(resolved.file, "feature.js");
  }

  #[test]
  fn resolves_pattern_subpath() {
    let m = manifest_with_exports(json!({
      "./utils/*": "./src/utils/*.js",
    }));
    let resolved = resolve_entry(&m, "utils/clamp", &Conditions::for_platform(Platform::Node)).unwrap();
    assert_eq!(resolved.file, "src/utils/clamp.js");
  }

  #[test]
  fn undefined_subpath_fails() {
    let m = manifest_with_exports(json!({ ".": "./index.js" }));
    let err = resolve_entry(&m, "missing", &Conditions::for_platform(Platform::Node)).unwrap_err();
    assert_eq!(err.kind(), "SubpathNotExported");
  }

  #[test]
  fn longer_literal_prefix_beats_pattern() {
    let m = manifest_with_exports(json!({
      "./utils/clamp": "./exact.js",
      "./utils/*": "./src/utils/*.js",
    }));
    let resolved = resolve_entry(&m, "utils/clamp", &Conditions::for_platform(Platform::Node)).unwrap();
    assert_eq!(resolved.file, "exact.js");
  }

  #[test]
  fn falls_back_to_module_then_main() {
    let m: PackageManifest = serde_json::from_value(json!({
      "name": "pkg",
      "version": "1.0.0",
      "dist": { "tarball": "https://example.invalid/pkg-1.0.0.tgz" },
      "module": "./esm/index.js",
      "main": "./cjs/index.js",
    }))
    .unwrap();
    let resolved = resolve_entry(&m, "", &Conditions::for_platform(Platform::Browser)).unwrap();
    assert_eq!(resolved.file, "esm/index.js");
  }
}
