//! Shared, session-scoped state every stage consults. Owned by the Build
//! Session (the root crate); stages borrow it for the lifetime of one
//! `resolve` call, mirroring how the teacher's `cli/bundler.rs` plugin hooks
//! receive a shared `&BundleContext` rather than stashing their own state.

use dashmap::DashMap;
use npmbundle_builtins::Runtime;
use npmbundle_cdn::CdnSpec;
use npmbundle_pkgcache::{HttpFetcher, PackageMetadataCache, Platform, TarballMountService};
use npmbundle_vfs::VirtualFileSystem;
use std::collections::HashMap;
use std::sync::Arc;

/// The axis that decides builtin externalization and `exports` condition
/// lists. `Browser` never externalizes a builtin natively; a `Runtime`
/// target externalizes whatever that runtime supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  Browser,
  Runtime(Runtime),
}

impl Target {
  pub fn conditions_platform(self) -> Platform {
    match self {
      Target::Browser => Platform::Browser,
      Target::Runtime(_) => Platform::Node,
    }
  }
}

const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".json"];

pub struct ResolverContext {
  pub vfs: Arc<dyn VirtualFileSystem>,
  pub target: Target,
  pub polyfill: bool,
  pub aliases: HashMap<String, String>,
  pub extensions: Vec<String>,
  pub loader_map: HashMap<String, String>,
  pub pkgcache: Arc<PackageMetadataCache>,
  pub tarballs: Arc<TarballMountService>,
  pub cdn: CdnSpec,
  pub fetcher: Arc<dyn HttpFetcher>,
  pub failed_extension_checks: DashMap<String, ()>,
  pub side_effects_matchers: DashMap<String, Arc<Vec<glob::Pattern>>>,
}

impl ResolverContext {
  pub fn new(
    vfs: Arc<dyn VirtualFileSystem>,
    target: Target,
    polyfill: bool,
    pkgcache: Arc<PackageMetadataCache>,
    tarballs: Arc<TarballMountService>,
    cdn: CdnSpec,
    fetcher: Arc<dyn HttpFetcher>,
  ) -> Self {
    Self {
      vfs,
      target,
      polyfill,
      aliases: HashMap::new(),
      extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
      loader_map: default_loader_map(),
      pkgcache,
      tarballs,
      cdn,
      fetcher,
      failed_extension_checks: DashMap::new(),
      side_effects_matchers: DashMap::new(),
    }
  }

  pub fn with_aliases(mut self, aliases: HashMap<String, String>) -> Self {
    self.aliases = aliases;
    self
  }

  pub fn with_loader_map(mut self, loader_map: HashMap<String, String>) -> Self {
    for (ext, loader) in loader_map {
      self.loader_map.insert(ext, loader);
    }
    self
  }

  /// `rebuild()` clears per-build negative caches and the side-effects
  /// matcher cache (rebuilt lazily); `pkgcache`/`tarballs` keep their own
  /// memoization across rebuilds, so they are not touched here.
  pub fn clear_per_build_caches(&self) {
    self.failed_extension_checks.clear();
    self.side_effects_matchers.clear();
  }

  pub fn infer_loader(&self, path: &str) -> String {
    let ext = match path.rfind('.') {
      Some(idx) => &path[idx..],
      None => return "js".to_string(),
    };
    if let Some(loader) = self.loader_map.get(ext) {
      return loader.clone();
    }
    match ext {
      ".mjs" | ".cjs" => "js".to_string(),
      ".ts" => "ts".to_string(),
      ".tsx" => "tsx".to_string(),
      ".jsx" => "jsx".to_string(),
      ".json" => "json".to_string(),
      _ => "js".to_string(),
    }
  }

  /// Builds (and memoizes) the glob matcher for a mounted package's
  /// `sideEffects` field, keyed by `mountRoot`. Built once per package per
  /// `spec.md` §3's `sideEffectsMatchersCache`.
  pub fn side_effects_matcher(
    &self,
    mount_root: &str,
    globs: &[String],
  ) -> Arc<Vec<glob::Pattern>> {
    if let Some(cached) = self.side_effects_matchers.get(mount_root) {
      return cached.clone();
    }
    let patterns: Vec<glob::Pattern> =
      globs.iter().filter_map(|g| glob::Pattern::new(g).ok()).collect();
    let patterns = Arc::new(patterns);
    self.side_effects_matchers.entry(mount_root.to_string()).or_insert_with(|| patterns.clone());
    patterns
  }
}

fn default_loader_map() -> HashMap<String, String> {
  let mut map = HashMap::new();
  map.insert(".png".to_string(), "file".to_string());
  map.insert(".jpeg".to_string(), "file".to_string());
  map.insert(".ttf".to_string(), "file".to_string());
  map.insert(".svg".to_string(), "text".to_string());
  map.insert(".html".to_string(), "text".to_string());
  map.insert(".scss".to_string(), "css".to_string());
  map
}
