//! Static database of Node.js builtin modules. Pure and table-driven: every
//! operation here is a lookup or a filter over `data::BUILTINS`, never an
//! I/O call, so it is tested the way `data::BUILTINS` itself is laid out —
//! one expected answer per entry.

mod data;

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
  Core,
  Worker,
  Deprecated,
  Experimental,
  Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
  Yes,
  No,
  Partial,
}

impl Support {
  fn is_supported(self, include_partial: bool) -> bool {
    match self {
      Support::Yes => true,
      Support::Partial => include_partial,
      Support::No => false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
  Node,
  Deno,
  Bun,
}

#[derive(Debug, Clone, Copy)]
pub struct BuiltinInfo {
  pub name: &'static str,
  pub category: Category,
  pub polyfill: Option<&'static str>,
  pub subpaths: &'static [&'static str],
  pub node: Support,
  pub deno: Support,
  pub bun: Support,
}

impl BuiltinInfo {
  pub fn has_subpaths(&self) -> bool {
    !self.subpaths.is_empty()
  }

  fn support_for(&self, runtime: Runtime) -> Support {
    match runtime {
      Runtime::Node => self.node,
      Runtime::Deno => self.deno,
      Runtime::Bun => self.bun,
    }
  }
}

/// Polyfill resolution aggressiveness, used by `get_polyfill_map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyfillProfile {
  /// Only stable `core` builtins that have a well-known browser polyfill.
  Conservative,
  /// `Conservative` plus `worker` builtins.
  Aggressive,
  /// Every entry that names a polyfill, regardless of category.
  Maximal,
}

/// Strips an optional `node:` prefix. `fs` and `node:fs` both become `fs`.
pub fn strip_node_prefix(spec: &str) -> &str {
  spec.strip_prefix("node:").unwrap_or(spec)
}

/// Strips the leading `node:` prefix (if any) and the first path segment,
/// leaving the bare builtin name: `node:fs/promises` -> `fs`.
fn base_name(spec: &str) -> &str {
  let stripped = strip_node_prefix(spec);
  match stripped.find('/') {
    Some(idx) => &stripped[..idx],
    None => stripped,
  }
}

fn find(spec: &str) -> Option<&'static BuiltinInfo> {
  let name = base_name(spec);
  data::BUILTINS.iter().find(|b| b.name == name)
}

pub fn is_builtin(spec: &str) -> bool {
  find(spec).is_some()
}

pub fn get_builtin_info(spec: &str) -> Option<&'static BuiltinInfo> {
  find(spec)
}

/// Rewrites `spec` to carry a canonical `node:` prefix if (and only if) it
/// names a builtin. Non-builtin specifiers pass through unchanged.
pub fn normalize(spec: &str) -> String {
  match find(spec) {
    Some(_) => format!("node:{}", strip_node_prefix(spec)),
    None => spec.to_string(),
  }
}

pub fn get_polyfill(spec: &str) -> Option<&'static str> {
  find(spec).and_then(|b| b.polyfill)
}

#[derive(Debug, Clone, Copy)]
pub struct ExternalPatternOptions {
  pub runtime: Runtime,
  pub include_deprecated: bool,
  pub include_experimental: bool,
  pub include_polyfillable: bool,
  pub include_subpaths: bool,
}

impl Default for ExternalPatternOptions {
  fn default() -> Self {
    Self {
      runtime: Runtime::Node,
      include_deprecated: false,
      include_experimental: false,
      include_polyfillable: true,
      include_subpaths: true,
    }
  }
}

/// Builds the ordered list of specifier patterns that should be treated as
/// externals (native to `options.runtime`) rather than resolved through the
/// CDN/tarball stages. Order follows the table's declaration order, which
/// is itself alphabetical — stable across calls, which the resolver chain's
/// determinism guarantee (§8.2) depends on.
pub fn get_external_patterns(options: ExternalPatternOptions) -> Vec<String> {
  let mut out = Vec::new();
  for entry in data::BUILTINS {
    if entry.category == Category::Deprecated && !options.include_deprecated {
      continue;
    }
    if entry.category == Category::Experimental && !options.include_experimental {
      continue;
    }
    let supported = entry.support_for(options.runtime).is_supported(true);
    if !supported {
      // Natively unsupported: only an external candidate if we're not
      // polyfilling it, i.e. the caller explicitly wants the bare list.
      if options.include_polyfillable && entry.polyfill.is_some() {
        continue;
      }
    }
    out.push(entry.name.to_string());
    if options.include_subpaths {
      for subpath in entry.subpaths {
        out.push(format!("{}/{}", entry.name, subpath));
      }
    }
  }
  out
}

/// Mapping of builtin name -> polyfill package name for the given
/// aggressiveness profile. `conservative` only ever includes `core`
/// builtins; `maximal` includes every entry that names a polyfill.
pub fn get_polyfill_map(profile: PolyfillProfile) -> HashMap<&'static str, &'static str> {
  data::BUILTINS
    .iter()
    .filter_map(|entry| {
      let polyfill = entry.polyfill?;
      let eligible = match profile {
        PolyfillProfile::Conservative => entry.category == Category::Core,
        PolyfillProfile::Aggressive => {
          matches!(entry.category, Category::Core | Category::Worker)
        }
        PolyfillProfile::Maximal => true,
      };
      eligible.then_some((entry.name, polyfill))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn is_builtin_strips_prefix_and_subpath() {
    assert!(is_builtin("fs"));
    assert!(is_builtin("node:fs"));
    assert!(is_builtin("node:fs/promises"));
    assert!(is_builtin("fs/promises"));
    assert!(!is_builtin("left-pad"));
  }

  #[test]
  fn normalize_round_trips_for_every_entry() {
    for entry in data::BUILTINS {
      let normalized = normalize(entry.name);
      assert_eq!(normalized, format!("node:{}", entry.name));
      assert!(is_builtin(&normalized));
      assert_eq!(strip_node_prefix(&normalized), entry.name);
    }
  }

  #[test]
  fn normalize_is_noop_for_non_builtins() {
    assert_eq!(normalize("camelcase"), "camelcase");
  }

  #[test]
  fn get_polyfill_returns_none_for_unpolyfillable_core_module() {
    assert_eq!(get_polyfill("net"), None);
    assert_eq!(get_polyfill("path"), Some("path-browserify"));
  }

  #[test]
  fn conservative_profile_excludes_deprecated_and_worker() {
    let map = get_polyfill_map(PolyfillProfile::Conservative);
    assert!(!map.contains_key("domain"));
    assert_eq!(map.get("path"), Some(&"path-browserify"));
  }

  #[test]
  fn maximal_profile_includes_deprecated() {
    let map = get_polyfill_map(PolyfillProfile::Maximal);
    assert_eq!(map.get("domain"), Some(&"domain-browser"));
  }

  #[test]
  fn external_patterns_exclude_experimental_by_default() {
    let patterns = get_external_patterns(ExternalPatternOptions::default());
    assert!(!patterns.iter().any(|p| p == "wasi"));
  }

  #[test]
  fn external_patterns_include_subpaths_when_requested() {
    let patterns = get_external_patterns(ExternalPatternOptions::default());
    assert!(patterns.iter().any(|p| p == "fs/promises"));
  }
}
