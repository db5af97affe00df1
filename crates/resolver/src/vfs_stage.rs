//! Stage 3: resolves relative/absolute specifiers directly against the
//! virtual filesystem, probing extensions and `index.<ext>` the way
//! esbuild's default resolver does for a `file://`-backed project.

use crate::context::ResolverContext;
use crate::error::ResolverError;
use crate::stage::ResolverStage;
use crate::types::{Namespace, ResolveRequest, ResolvedModule, StageOutcome};
use async_trait::async_trait;
use npmbundle_vfs::{VirtualFileSystem, VirtualPath};

#[derive(Debug, Default)]
pub struct VfsStage;

fn is_path_specifier(specifier: &str) -> bool {
  specifier.starts_with('.') || specifier.starts_with('/')
}

#[async_trait]
impl ResolverStage for VfsStage {
  fn name(&self) -> &'static str {
    "vfs"
  }

  async fn resolve(
    &self,
    request: &ResolveRequest,
    ctx: &ResolverContext,
  ) -> Result<StageOutcome, ResolverError> {
    if !is_path_specifier(&request.specifier) {
      return Ok(StageOutcome::Defer);
    }

    let base = if request.specifier.starts_with('/') {
      VirtualPath::new("/")?
    } else {
      request.resolve_dir.clone()
    };
    let joined = base.join(&request.specifier)?;

    if let Some(path) = probe_extensions(ctx, &joined) {
      let loader = ctx.infer_loader(path.as_str());
      return Ok(StageOutcome::Resolved(ResolvedModule {
        path,
        namespace: Namespace::Vfs,
        loader,
        side_effects: None,
      }));
    }

    Ok(StageOutcome::Defer)
  }
}

/// Exact match first, then each extension in `ctx.extensions` order, then
/// `/index.<ext>` for each extension in the same order — matching the
/// documented tie-break ("exact match first, then in the listed order").
fn probe_extensions(ctx: &ResolverContext, path: &VirtualPath) -> Option<VirtualPath> {
  if ctx.vfs.exists(path) {
    return Some(path.clone());
  }
  for ext in &ctx.extensions {
    if let Ok(candidate) = VirtualPath::new(&format!("{}{}", path.as_str(), ext)) {
      if ctx.vfs.exists(&candidate) {
        return Some(candidate);
      }
    }
  }
  for ext in &ctx.extensions {
    if let Ok(candidate) = VirtualPath::new(&format!("{}/index{}", path.as_str(), ext)) {
      if ctx.vfs.exists(&candidate) {
        return Some(candidate);
      }
    }
  }
  None
}
