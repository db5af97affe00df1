use npmbundle_pkgcache::PackageError;
use npmbundle_vfs::VfsError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ResolverError {
  #[error("module not found: {specifier}")]
  ModuleNotFound { specifier: String },
  #[error("ambiguous resolution for {specifier}: {candidates:?}")]
  AmbiguousResolution { specifier: String, candidates: Vec<String> },
  #[error(transparent)]
  Package(#[from] PackageError),
  #[error(transparent)]
  Vfs(#[from] VfsError),
}

impl ResolverError {
  pub fn kind(&self) -> &'static str {
    match self {
      ResolverError::ModuleNotFound { .. } => "ModuleNotFound",
      ResolverError::AmbiguousResolution { .. } => "AmbiguousResolution",
      ResolverError::Package(e) => e.kind(),
      ResolverError::Vfs(e) => e.kind(),
    }
  }
}
