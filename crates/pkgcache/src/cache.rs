//! Session-facing package metadata cache: ties together registry-document
//! fetch, version resolution (`version.rs`), manifest storage, and entry
//! resolution (`exports.rs`) behind the memoization/negative-cache shape
//! `spec.md` §3 calls `LocalState` — `versions`, `packageManifests`, and the
//! `failedManifestUrls` negative cache. `tarballMounts` lives in
//! `TarballMountService` (`tarball.rs`) rather than here, same as the spec's
//! own component split.

use crate::error::PackageError;
use crate::exports::{resolve_entry, Conditions, ResolvedEntry};
use crate::fetcher::HttpFetcher;
use crate::manifest::{PackageManifest, RegistryDocument};
use crate::version::{parse_exact, resolve_version_from_doc};
use dashmap::DashMap;
use semver::Version;
use std::sync::Arc;
use url::Url;

/// Default npm registry origin used to fetch registry documents. Not the
/// CDN model (`npmbundle_cdn`) — that constructs tarball/file URLs for an
/// already-resolved version; this is the `{name}` -> full version-history
/// document endpoint npm's registry itself serves.
pub const DEFAULT_REGISTRY_ORIGIN: &str = "https://registry.npmjs.org";

/// Fetches and memoizes npm registry documents, resolved versions, and
/// per-version manifests for the lifetime of a build session. Cleared
/// selectively by `clear_negative_caches` on `rebuild()`; `tarballMounts` is
/// owned separately by `TarballMountService` and outlives rebuilds the same
/// way `package_manifests`/`versions` do here.
#[derive(Debug)]
pub struct PackageMetadataCache {
  registry_origin: String,
  registry_docs: DashMap<String, Arc<RegistryDocument>>,
  versions: DashMap<(String, String), Version>,
  package_manifests: DashMap<(String, String), Arc<PackageManifest>>,
  failed_manifest_urls: DashMap<String, ()>,
}

impl PackageMetadataCache {
  pub fn new() -> Self {
    Self::with_registry_origin(DEFAULT_REGISTRY_ORIGIN)
  }

  pub fn with_registry_origin(origin: impl Into<String>) -> Self {
    Self {
      registry_origin: origin.into(),
      registry_docs: DashMap::new(),
      versions: DashMap::new(),
      package_manifests: DashMap::new(),
      failed_manifest_urls: DashMap::new(),
    }
  }

  pub fn versions_len(&self) -> usize {
    self.versions.len()
  }

  pub fn package_manifests_len(&self) -> usize {
    self.package_manifests.len()
  }

  /// `rebuild()` clears `failedExtensionChecks`/`failedManifestUrls` only;
  /// `versions`/`packageManifests`/`tarballMounts` are preserved across
  /// rebuilds within the same session.
  pub fn clear_negative_caches(&self) {
    self.failed_manifest_urls.clear();
  }

  /// Synchronous, no-fetch lookup against the `versions` memoization cache.
  /// Used by the resolver chain's Tarball stage to check "is this package
  /// already resolved+mounted this session" without awaiting anything.
  pub fn peek_version(&self, name: &str, range_or_tag: &str) -> Option<Version> {
    self.versions.get(&(name.to_string(), range_or_tag.to_string())).map(|v| v.clone())
  }

  /// Synchronous, no-fetch lookup against the `packageManifests` cache.
  pub fn peek_manifest(&self, name: &str, exact_version: &Version) -> Option<Arc<PackageManifest>> {
    self.package_manifests.get(&(name.to_string(), exact_version.to_string())).map(|m| m.clone())
  }

  /// Every manifest memoized so far this session, for `BuildResult.packageSizeArr`
  /// (`spec.md` §4.G: "formed by iterating `packageManifests`").
  pub fn all_manifests(&self) -> Vec<Arc<PackageManifest>> {
    self.package_manifests.iter().map(|e| e.value().clone()).collect()
  }

  fn registry_url(&self, name: &str) -> String {
    format!("{}/{}", self.registry_origin, encode_package_name(name))
  }

  async fn fetch_registry_doc(
    &self,
    name: &str,
    fetcher: &Arc<dyn HttpFetcher>,
  ) -> Result<Arc<RegistryDocument>, PackageError> {
    if let Some(doc) = self.registry_docs.get(name) {
      return Ok(doc.clone());
    }

    let url_str = self.registry_url(name);
    if self.failed_manifest_urls.contains_key(&url_str) {
      return Err(PackageError::ManifestUnavailable { url: url_str, reason: "negatively cached".to_string() });
    }

    let url = Url::parse(&url_str)
      .map_err(|e| PackageError::ManifestMalformed { name: name.to_string(), reason: e.to_string() })?;

    let bytes = match fetcher.fetch(&url).await {
      Ok(bytes) => bytes,
      Err(e) => {
        self.failed_manifest_urls.insert(url_str.clone(), ());
        return Err(PackageError::ManifestUnavailable { url: url_str, reason: e.to_string() });
      }
    };

    let doc: RegistryDocument = serde_json::from_slice(&bytes)
      .map_err(|e| PackageError::ManifestMalformed { name: name.to_string(), reason: e.to_string() })?;
    let doc = Arc::new(doc);
    self.registry_docs.entry(name.to_string()).or_insert_with(|| doc.clone());
    Ok(doc)
  }

  /// `resolveVersion(name, rangeOrTag) -> ExactSemver`.
  pub async fn resolve_version(
    &self,
    name: &str,
    range_or_tag: &str,
    fetcher: &Arc<dyn HttpFetcher>,
  ) -> Result<Version, PackageError> {
    if let Some(exact) = parse_exact(range_or_tag) {
      return Ok(exact);
    }
    let key = (name.to_string(), range_or_tag.to_string());
    if let Some(cached) = self.versions.get(&key) {
      return Ok(cached.clone());
    }
    let doc = self.fetch_registry_doc(name, fetcher).await?;
    let version = resolve_version_from_doc(name, range_or_tag, &doc)?;
    self.versions.entry(key).or_insert_with(|| version.clone());
    Ok(version)
  }

  /// `getManifest(name, exactVersion) -> PackageManifest`.
  pub async fn get_manifest(
    &self,
    name: &str,
    exact_version: &Version,
    fetcher: &Arc<dyn HttpFetcher>,
  ) -> Result<Arc<PackageManifest>, PackageError> {
    let version_str = exact_version.to_string();
    let key = (name.to_string(), version_str.clone());
    if let Some(cached) = self.package_manifests.get(&key) {
      return Ok(cached.clone());
    }
    let doc = self.fetch_registry_doc(name, fetcher).await?;
    let manifest = doc
      .versions
      .get(&version_str)
      .cloned()
      .ok_or_else(|| PackageError::ManifestMalformed {
        name: name.to_string(),
        reason: format!("registry document has no entry for version {version_str}"),
      })?;
    let manifest = Arc::new(manifest);
    self.package_manifests.entry(key).or_insert_with(|| manifest.clone());
    Ok(manifest)
  }

  /// `resolveEntry(manifest, subpath, conditions) -> { file, sideEffects? }`.
  /// Pure wrt the cache; kept here so callers don't need to import
  /// `exports::resolve_entry` directly.
  pub fn resolve_entry(
    &self,
    manifest: &PackageManifest,
    subpath: &str,
    conditions: &Conditions,
  ) -> Result<ResolvedEntry, PackageError> {
    resolve_entry(manifest, subpath, conditions)
  }
}

impl Default for PackageMetadataCache {
  fn default() -> Self {
    Self::new()
  }
}

/// npm package names containing `/` (scoped packages) must have that slash
/// percent-encoded when used as a single path segment against the registry.
fn encode_package_name(name: &str) -> String {
  name.replace('/', "%2f")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fetcher::MockFetcher;
  use serde_json::json;

  fn registry_body(name: &str, versions: &[&str], dist_tags: &[(&str, &str)]) -> String {
    let mut versions_obj = serde_json::Map::new();
    for v in versions {
      versions_obj.insert(
        v.to_string(),
        json!({
          "name": name,
          "version": v,
          "dist": { "tarball": format!("https://example.invalid/{name}-{v}.tgz") },
        }),
      );
    }
    let mut dist_tags_obj = serde_json::Map::new();
    for (tag, v) in dist_tags {
      dist_tags_obj.insert(tag.to_string(), json!(v));
    }
    json!({
      "name": name,
      "dist-tags": dist_tags_obj,
      "versions": versions_obj,
    })
    .to_string()
  }

  #[tokio::test]
  async fn resolve_version_memoizes_registry_fetch() {
    let mock = Arc::new(MockFetcher::new());
    mock.serve(
      "https://registry.npmjs.org/left-pad",
      registry_body("left-pad", &["1.0.0", "1.3.0"], &[("latest", "1.3.0")]),
    );
    let fetcher: Arc<dyn HttpFetcher> = mock.clone();
    let cache = PackageMetadataCache::new();

    let v1 = cache.resolve_version("left-pad", "^1.0.0", &fetcher).await.unwrap();
    assert_eq!(v1, Version::parse("1.3.0").unwrap());
    let v2 = cache.resolve_version("left-pad", "latest", &fetcher).await.unwrap();
    assert_eq!(v2, Version::parse("1.3.0").unwrap());

    assert_eq!(mock.call_count("https://registry.npmjs.org/left-pad"), 1);
    assert_eq!(cache.versions_len(), 2);
  }

  #[tokio::test]
  async fn get_manifest_memoizes_and_shares_registry_doc() {
    let mock = Arc::new(MockFetcher::new());
    mock.serve("https://registry.npmjs.org/camelcase", registry_body("camelcase", &["6.3.0"], &[]));
    let fetcher: Arc<dyn HttpFetcher> = mock.clone();
    let cache = PackageMetadataCache::new();

    let version = cache.resolve_version("camelcase", "6.3.0", &fetcher).await.unwrap();
    let manifest = cache.get_manifest("camelcase", &version, &fetcher).await.unwrap();
    assert_eq!(manifest.dist.tarball, "https://example.invalid/camelcase-6.3.0.tgz");
    let manifest_again = cache.get_manifest("camelcase", &version, &fetcher).await.unwrap();
    assert!(Arc::ptr_eq(&manifest, &manifest_again));
    assert_eq!(mock.call_count("https://registry.npmjs.org/camelcase"), 1);
  }

  #[tokio::test]
  async fn failed_manifest_fetch_is_negatively_cached() {
    let mock = Arc::new(MockFetcher::new());
    mock.fail("https://registry.npmjs.org/does-not-exist", 404);
    let fetcher: Arc<dyn HttpFetcher> = mock.clone();
    let cache = PackageMetadataCache::new();

    let err1 = cache.resolve_version("does-not-exist", "latest", &fetcher).await.unwrap_err();
    assert_eq!(err1.kind(), "ManifestUnavailable");
    let err2 = cache.resolve_version("does-not-exist", "latest", &fetcher).await.unwrap_err();
    assert_eq!(err2.kind(), "ManifestUnavailable");
    assert_eq!(mock.call_count("https://registry.npmjs.org/does-not-exist"), 1);
  }

  #[tokio::test]
  async fn clear_negative_caches_allows_retry() {
    let mock = Arc::new(MockFetcher::new());
    mock.fail("https://registry.npmjs.org/flaky", 503);
    let fetcher: Arc<dyn HttpFetcher> = mock.clone();
    let cache = PackageMetadataCache::new();

    cache.resolve_version("flaky", "latest", &fetcher).await.unwrap_err();
    cache.clear_negative_caches();
    mock.serve("https://registry.npmjs.org/flaky", registry_body("flaky", &["1.0.0"], &[("latest", "1.0.0")]));
    let resolved = cache.resolve_version("flaky", "latest", &fetcher).await.unwrap();
    assert_eq!(resolved, Version::parse("1.0.0").unwrap());
  }

  #[tokio::test]
  async fn exact_version_resolves_without_fetching_even_when_registry_is_unavailable() {
    let mock = Arc::new(MockFetcher::new());
    mock.fail("https://registry.npmjs.org/pinned", 503);
    let fetcher: Arc<dyn HttpFetcher> = mock.clone();
    let cache = PackageMetadataCache::new();

    let resolved = cache.resolve_version("pinned", "1.2.3", &fetcher).await.unwrap();
    assert_eq!(resolved, Version::parse("1.2.3").unwrap());
    assert_eq!(mock.call_count("https://registry.npmjs.org/pinned"), 0);
  }
}
