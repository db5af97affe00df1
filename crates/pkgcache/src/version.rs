use crate::error::PackageError;
use crate::manifest::RegistryDocument;
use semver::{Version, VersionReq};

/// `resolveVersion(name, rangeOrTag) -> ExactSemver` step 1 and steps 4-5,
/// split out of the async fetch-and-memoize wrapper in `cache.rs` so the
/// pure selection logic (which version wins, how ties are broken) can be
/// unit tested without a fetcher.
pub fn resolve_version_from_doc(
  name: &str,
  range_or_tag: &str,
  doc: &RegistryDocument,
) -> Result<Version, PackageError> {
  if let Some(exact) = parse_exact(range_or_tag) {
    return Ok(exact);
  }
  if let Some(tagged) = doc.dist_tags.get(range_or_tag) {
    return Version::parse(tagged).map_err(|_| PackageError::VersionUnresolvable {
      name: name.to_string(),
      range: range_or_tag.to_string(),
    });
  }
  let req = VersionReq::parse(range_or_tag).map_err(|_| PackageError::VersionUnresolvable {
    name: name.to_string(),
    range: range_or_tag.to_string(),
  })?;
  doc
    .versions
    .keys()
    .filter_map(|v| Version::parse(v).ok())
    .filter(|v| req.matches(v))
    .max()
    .ok_or_else(|| PackageError::VersionUnresolvable {
      name: name.to_string(),
      range: range_or_tag.to_string(),
    })
}

/// Step 1 of the algorithm: if the input is already an exact version,
/// short-circuit without ever fetching a manifest.
pub(crate) fn parse_exact(input: &str) -> Option<Version> {
  Version::parse(input).ok()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  fn doc_with_versions(name: &str, versions: &[&str]) -> RegistryDocument {
    let mut map = BTreeMap::new();
    for v in versions {
      map.insert(
        v.to_string(),
        serde_json::from_value(serde_json::json!({
          "name": name,
          "version": v,
          "dist": { "tarball": format!("https://example.invalid/{name}-{v}.tgz") },
        }))
        .unwrap(),
      );
    }
    RegistryDocument { name: name.to_string(), dist_tags: BTreeMap::new(), versions: map }
  }

  #[test]
  fn exact_version_short_circuits() {
    let doc = doc_with_versions("pkg", &["1.0.0"]);
    let resolved = resolve_version_from_doc("pkg", "2.5.0", &doc).unwrap();
    assert_eq!(resolved, Version::parse("2.5.0").unwrap());
  }

  #[test]
  fn caret_range_picks_highest_matching() {
    let doc = doc_with_versions("pkg", &["1.2.1", "1.3.0", "2.0.0"]);
    let resolved = resolve_version_from_doc("pkg", "^1.2.0", &doc).unwrap();
    assert_eq!(resolved, Version::parse("1.3.0").unwrap());
  }

  #[test]
  fn prerelease_excluded_unless_pinned() {
    let doc = doc_with_versions("pkg", &["1.0.0", "1.1.0-beta.1"]);
    let resolved = resolve_version_from_doc("pkg", "^1.0.0", &doc).unwrap();
    assert_eq!(resolved, Version::parse("1.0.0").unwrap());
  }

  #[test]
  fn unmatched_range_is_unresolvable() {
    let doc = doc_with_versions("pkg", &["1.0.0"]);
    let err = resolve_version_from_doc("pkg", "^2.0.0", &doc).unwrap_err();
    assert_eq!(err.kind(), "VersionUnresolvable");
  }

  #[test]
  fn dist_tag_resolves_to_its_version() {
    let mut doc = doc_with_versions("pkg", &["1.0.0", "2.0.0"]);
    doc.dist_tags.insert("latest".to_string(), "2.0.0".to_string());
    let resolved = resolve_version_from_doc("pkg", "latest", &doc).unwrap();
    assert_eq!(resolved, Version::parse("2.0.0").unwrap());
  }
}
