use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct DistInfo {
  pub tarball: String,
  #[serde(rename = "unpackedSize")]
  pub unpacked_size: Option<u64>,
  pub shasum: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SideEffects {
  Flag(bool),
  Globs(Vec<String>),
}

impl<'de> Deserialize<'de> for SideEffects {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
      serde_json::Value::Bool(b) => Ok(SideEffects::Flag(b)),
      serde_json::Value::Array(items) => Ok(SideEffects::Globs(
        items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
      )),
      other => Err(serde::de::Error::custom(format!("invalid sideEffects value: {other}"))),
    }
  }
}

/// The relevant subset of an npm registry per-version package document.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
  pub name: String,
  pub version: String,
  pub main: Option<String>,
  pub module: Option<String>,
  pub browser: Option<serde_json::Value>,
  pub exports: Option<serde_json::Value>,
  pub imports: Option<serde_json::Value>,
  #[serde(rename = "type")]
  pub module_type: Option<String>,
  pub dist: DistInfo,
  #[serde(default)]
  pub dependencies: IndexMap<String, String>,
  #[serde(rename = "peerDependenciesMeta")]
  pub peer_dependencies_meta: Option<serde_json::Value>,
  #[serde(rename = "sideEffects")]
  pub side_effects: Option<SideEffects>,
}

/// Union of `PackageManifest` with the enclosing registry document's
/// sibling fields needed for version resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDocument {
  pub name: String,
  #[serde(rename = "dist-tags")]
  pub dist_tags: BTreeMap<String, String>,
  pub versions: BTreeMap<String, PackageManifest>,
}
