//! Recovers the semver range a bare specifier should resolve against: the
//! enclosing mounted package's own `dependencies` entry if the importer
//! lives under `/node_modules/...`, else `"latest"` for top-level imports.

use crate::context::ResolverContext;
use crate::error::ResolverError;
use npmbundle_vfs::VirtualPath;

pub const DEFAULT_RANGE: &str = "latest";

pub async fn dependency_range_for(
  ctx: &ResolverContext,
  importer: Option<&VirtualPath>,
  dependency_name: &str,
) -> Result<String, ResolverError> {
  let Some(importer) = importer else { return Ok(DEFAULT_RANGE.to_string()) };
  let Some(owner) = ctx.tarballs.find_owning(importer) else { return Ok(DEFAULT_RANGE.to_string()) };

  let version = semver::Version::parse(&owner.version)
    .map_err(|_| ResolverError::ModuleNotFound { specifier: dependency_name.to_string() })?;
  let manifest = ctx.pkgcache.get_manifest(&owner.name, &version, &ctx.fetcher).await?;
  Ok(manifest.dependencies.get(dependency_name).cloned().unwrap_or_else(|| DEFAULT_RANGE.to_string()))
}
