//! Stage 4: fast path for a bare specifier whose package is already
//! resolved and mounted this session — skips the CDN stage's network-aware
//! resolve-version/get-manifest/mount sequence entirely.

use crate::context::ResolverContext;
use crate::deps::dependency_range_for;
use crate::error::ResolverError;
use crate::stage::ResolverStage;
use crate::types::{Namespace, ResolveRequest, ResolvedModule, StageOutcome};
use async_trait::async_trait;
use npmbundle_cdn::PackageRef;
use npmbundle_pkgcache::{resolve_entry, Conditions, SideEffects, SideEffectsDecl};
use npmbundle_vfs::VirtualPath;

#[derive(Debug, Default)]
pub struct TarballStage;

#[async_trait]
impl ResolverStage for TarballStage {
  fn name(&self) -> &'static str {
    "tarball"
  }

  async fn resolve(
    &self,
    request: &ResolveRequest,
    ctx: &ResolverContext,
  ) -> Result<StageOutcome, ResolverError> {
    if request.specifier.starts_with('.') || request.specifier.starts_with('/') || request.specifier.contains("://") {
      return Ok(StageOutcome::Defer);
    }
    let Ok((name, subpath)) = PackageRef::split_bare_specifier(&request.specifier) else {
      return Ok(StageOutcome::Defer);
    };
    let name = name.to_string();

    let range = dependency_range_for(ctx, request.importer.as_ref(), &name).await?;
    let Some(version) = ctx.pkgcache.peek_version(&name, &range) else { return Ok(StageOutcome::Defer) };
    let mount_root_str = format!("/node_modules/{name}@{version}");
    if !ctx.tarballs.is_mounted(&mount_root_str) {
      return Ok(StageOutcome::Defer);
    }
    let Some(manifest) = ctx.pkgcache.peek_manifest(&name, &version) else { return Ok(StageOutcome::Defer) };

    let conditions = Conditions::for_platform(ctx.target.conditions_platform());
    let entry = resolve_entry(&manifest, &subpath, &conditions)?;
    let path = VirtualPath::new(&format!("{mount_root_str}/{}", entry.file))?;
    let loader = ctx.infer_loader(path.as_str());
    let side_effects = side_effects_for(ctx, &mount_root_str, &manifest.side_effects, entry.side_effects);

    Ok(StageOutcome::Resolved(ResolvedModule { path, namespace: Namespace::Vfs, loader, side_effects }))
  }
}

pub(crate) fn side_effects_for(
  ctx: &ResolverContext,
  mount_root: &str,
  manifest_side_effects: &Option<SideEffects>,
  entry_side_effects: Option<SideEffectsDecl>,
) -> Option<SideEffectsDecl> {
  if entry_side_effects.is_some() {
    return entry_side_effects;
  }
  match manifest_side_effects {
    Some(SideEffects::Flag(flag)) => Some(SideEffectsDecl::Flag(*flag)),
    Some(SideEffects::Globs(globs)) => {
      ctx.side_effects_matcher(mount_root, globs);
      Some(SideEffectsDecl::Globs(globs.clone()))
    }
    None => None,
  }
}
