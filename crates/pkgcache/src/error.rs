use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PackageError {
  #[error("manifest unavailable for {url}: {reason}")]
  ManifestUnavailable { url: String, reason: String },
  #[error("manifest for {name} is malformed: {reason}")]
  ManifestMalformed { name: String, reason: String },
  #[error("no version of {name} satisfies {range}")]
  VersionUnresolvable { name: String, range: String },
  #[error("package {name}@{version} does not export subpath {subpath:?}")]
  SubpathNotExported { name: String, version: String, subpath: String },
  #[error("failed to fetch tarball {url}: {cause}")]
  TarballFetchFailed { url: String, cause: String },
  #[error("tarball for {name}@{version} is corrupt: {reason}")]
  TarballCorrupt { name: String, version: String, reason: String },
}

impl PackageError {
  pub fn kind(&self) -> &'static str {
    match self {
      PackageError::ManifestUnavailable { .. } => "ManifestUnavailable",
      PackageError::ManifestMalformed { .. } => "ManifestMalformed",
      PackageError::VersionUnresolvable { .. } => "VersionUnresolvable",
      PackageError::SubpathNotExported { .. } => "SubpathNotExported",
      PackageError::TarballFetchFailed { .. } => "TarballFetchFailed",
      PackageError::TarballCorrupt { .. } => "TarballCorrupt",
    }
  }
}
