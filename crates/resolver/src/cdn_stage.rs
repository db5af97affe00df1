//! Stage 6: bare specifiers not claimed by any earlier stage. Runs the full
//! resolve-version -> get-manifest -> mount -> resolve-entry sequence
//! documented in `spec.md` §4.F.6.

use crate::context::ResolverContext;
use crate::deps::dependency_range_for;
use crate::error::ResolverError;
use crate::stage::ResolverStage;
use crate::tarball_stage::side_effects_for;
use crate::types::{Namespace, ResolveRequest, ResolvedModule, StageOutcome};
use async_trait::async_trait;
use npmbundle_cdn::PackageRef;
use npmbundle_pkgcache::{resolve_entry, Conditions};
use npmbundle_vfs::VirtualPath;

#[derive(Debug, Default)]
pub struct CdnStage;

#[async_trait]
impl ResolverStage for CdnStage {
  fn name(&self) -> &'static str {
    "cdn"
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
    let version = ctx.pkgcache.resolve_version(&name, &range, &ctx.fetcher).await?;
    let manifest = ctx.pkgcache.get_manifest(&name, &version, &ctx.fetcher).await?;

    let version_str = version.to_string();
    let mount_root_str = format!("/node_modules/{name}@{version_str}");
    if !ctx.tarballs.is_mounted(&mount_root_str) {
      let tarball_url = url::Url::parse(&manifest.dist.tarball)
        .map_err(|_| ResolverError::ModuleNotFound { specifier: request.specifier.clone() })?;
      log::info!("cdn: mounting {name}@{version_str}");
      ctx
        .tarballs
        .mount(&name, &version_str, tarball_url, ctx.fetcher.clone(), ctx.vfs.clone())
        .await?;
    }

    let conditions = Conditions::for_platform(ctx.target.conditions_platform());
    let entry = resolve_entry(&manifest, &subpath, &conditions)?;
    let path = VirtualPath::new(&format!("{mount_root_str}/{}", entry.file))?;
    let loader = ctx.infer_loader(path.as_str());
    let side_effects = side_effects_for(ctx, &mount_root_str, &manifest.side_effects, entry.side_effects);

    Ok(StageOutcome::Resolved(ResolvedModule { path, namespace: Namespace::Vfs, loader, side_effects }))
  }
}
