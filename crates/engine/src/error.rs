//! Top-level error facade. Wraps every leaf crate's narrower `thiserror`
//! enum behind one type with a stable `kind()` string per entry, the way
//! the teacher's `deno_error.rs` wraps `ReadlineError`/`hyper::Error`/
//! `url::ParseError` etc. behind one facade rather than leaking each leaf
//! crate's error type at the public surface.

use crate::events::Notice;
use npmbundle_cdn::CdnError;
use npmbundle_pkgcache::PackageError;
use npmbundle_resolver::ResolverError;
use npmbundle_vfs::VfsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
  #[error("invalid build configuration: {reason}")]
  ConfigInvalid { reason: String },
  #[error("engine bootstrap failed: {reason}")]
  EngineInitFailed { reason: String },
  #[error("build failed with {} notice(s)", notices.len())]
  BuildFailed { notices: Vec<Notice> },
  #[error("build error: {cause}")]
  BuildError { cause: String },
  #[error("build was cancelled")]
  BuildCancelled,
  #[error("build was superseded by a later rebuild")]
  Superseded,
  #[error("session has already been disposed")]
  Disposed,
  #[error(transparent)]
  Resolver(#[from] ResolverError),
  #[error(transparent)]
  Package(#[from] PackageError),
  #[error(transparent)]
  Vfs(#[from] VfsError),
  #[error(transparent)]
  Cdn(#[from] CdnError),
}

impl OrchestratorError {
  pub fn kind(&self) -> &'static str {
    match self {
      OrchestratorError::ConfigInvalid { .. } => "ConfigInvalid",
      OrchestratorError::EngineInitFailed { .. } => "EngineInitFailed",
      OrchestratorError::BuildFailed { .. } => "BuildFailed",
      OrchestratorError::BuildError { .. } => "BuildError",
      OrchestratorError::BuildCancelled => "BuildCancelled",
      OrchestratorError::Superseded => "Superseded",
      OrchestratorError::Disposed => "Disposed",
      OrchestratorError::Resolver(e) => e.kind(),
      OrchestratorError::Package(e) => e.kind(),
      OrchestratorError::Vfs(e) => e.kind(),
      OrchestratorError::Cdn(_) => "ConfigInvalid",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wrapped_resolver_error_forwards_kind() {
    let err: OrchestratorError =
      ResolverError::ModuleNotFound { specifier: "left-pad".to_string() }.into();
    assert_eq!(err.kind(), "ModuleNotFound");
  }

  #[test]
  fn lifecycle_variants_have_stable_kinds() {
    assert_eq!(OrchestratorError::Disposed.kind(), "Disposed");
    assert_eq!(OrchestratorError::BuildCancelled.kind(), "BuildCancelled");
    assert_eq!(OrchestratorError::Superseded.kind(), "Superseded");
  }
}
