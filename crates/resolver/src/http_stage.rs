//! Stage 5: absolute `http(s):` specifiers, or any specifier whose importer
//! lives in the `http` namespace (a relative import from a URL-sourced
//! module). Fetched once per session and stored into the VFS under a
//! deterministic path derived from the URL, so a later rebuild that doesn't
//! clear the VFS never re-fetches.

use crate::context::ResolverContext;
use crate::error::ResolverError;
use crate::stage::ResolverStage;
use crate::types::{Namespace, ResolveRequest, ResolvedModule, StageOutcome};
use async_trait::async_trait;
use bytes::Bytes;
use npmbundle_vfs::VirtualPath;
use url::Url;

#[derive(Debug, Default)]
pub struct HttpStage;

fn is_url_specifier(specifier: &str) -> bool {
  specifier.starts_with("http://") || specifier.starts_with("https://")
}

fn is_http_importer(importer: Option<&VirtualPath>) -> bool {
  importer.map(|p| p.is_under(&VirtualPath::new("/.http").unwrap())).unwrap_or(false)
}

/// Deterministic VFS path for a fetched URL: `/.http/{host}/{path}`, so two
/// resolves of the same URL within (or across) rebuilds land on the same
/// entry and the VFS's own existence check short-circuits a re-fetch.
fn vfs_path_for_url(url: &Url) -> Result<VirtualPath, ResolverError> {
  let host = url.host_str().unwrap_or("unknown-host");
  let path = url.path().trim_start_matches('/');
  let full = if path.is_empty() { format!("/.http/{host}/index") } else { format!("/.http/{host}/{path}") };
  Ok(VirtualPath::new(&full)?)
}

#[async_trait]
impl ResolverStage for HttpStage {
  fn name(&self) -> &'static str {
    "http"
  }

  async fn resolve(
    &self,
    request: &ResolveRequest,
    ctx: &ResolverContext,
  ) -> Result<StageOutcome, ResolverError> {
    let url = if is_url_specifier(&request.specifier) {
      Url::parse(&request.specifier).map_err(|_| ResolverError::ModuleNotFound { specifier: request.specifier.clone() })?
    } else if is_http_importer(request.importer.as_ref()) {
      let base = Url::parse(&format!("https:/{}", request.resolve_dir.as_str().trim_start_matches("/.http")))
        .map_err(|_| ResolverError::ModuleNotFound { specifier: request.specifier.clone() })?;
      base
        .join(&request.specifier)
        .map_err(|_| ResolverError::ModuleNotFound { specifier: request.specifier.clone() })?
    } else {
      return Ok(StageOutcome::Defer);
    };

    let vfs_path = vfs_path_for_url(&url)?;
    if ctx.vfs.exists(&vfs_path) {
      let loader = ctx.infer_loader(vfs_path.as_str());
      return Ok(StageOutcome::Resolved(ResolvedModule {
        path: vfs_path,
        namespace: Namespace::Http,
        loader,
        side_effects: None,
      }));
    }

    let cache_key = url.as_str().to_string();
    if ctx.failed_extension_checks.contains_key(&cache_key) {
      return Err(ResolverError::ModuleNotFound { specifier: request.specifier.clone() });
    }

    log::debug!("http: fetching {url}");
    let bytes: Bytes = match ctx.fetcher.fetch(&url).await {
      Ok(bytes) => bytes,
      Err(_) => {
        ctx.failed_extension_checks.insert(cache_key, ());
        return Err(ResolverError::ModuleNotFound { specifier: request.specifier.clone() });
      }
    };
    ctx.vfs.write(&vfs_path, bytes)?;

    let loader = ctx.infer_loader(vfs_path.as_str());
    Ok(StageOutcome::Resolved(ResolvedModule { path: vfs_path, namespace: Namespace::Http, loader, side_effects: None }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::empty_context_with_fetcher;
  use crate::types::ImportKind;

  #[tokio::test]
  async fn fetches_and_caches_url_import() {
    let (ctx, mock) = empty_context_with_fetcher();
    mock.serve("https://example.invalid/mod.js", "export const x = 1;");
    let req = ResolveRequest {
      specifier: "https://example.invalid/mod.js".to_string(),
      importer: None,
      resolve_dir: VirtualPath::new("/").unwrap(),
      kind: ImportKind::ImportStatement,
    };
    match HttpStage.resolve(&req, &ctx).await.unwrap() {
      StageOutcome::Resolved(m) => assert_eq!(m.namespace, Namespace::Http),
      other => panic!("expected Resolved, got {other:?}"),
    }
    assert_eq!(mock.call_count("https://example.invalid/mod.js"), 1);

    // A second resolve must hit the VFS, not the network again.
    HttpStage.resolve(&req, &ctx).await.unwrap();
    assert_eq!(mock.call_count("https://example.invalid/mod.js"), 1);
  }

  #[tokio::test]
  async fn non_url_specifier_defers() {
    let ctx = empty_context_with_fetcher().0;
    let req = ResolveRequest {
      specifier: "camelcase".to_string(),
      importer: None,
      resolve_dir: VirtualPath::new("/").unwrap(),
      kind: ImportKind::ImportStatement,
    };
    assert!(matches!(HttpStage.resolve(&req, &ctx).await.unwrap(), StageOutcome::Defer));
  }
}
