//! Drives a fixed, ordered stage list: alias -> external -> vfs -> tarball
//! -> http -> cdn. A stage that resolves or externalizes short-circuits the
//! rest; one that rewrites mutates the in-flight specifier and continues to
//! the *next* stage (not stage 0) so alias/polyfill rewrites can't loop.

use crate::alias::AliasStage;
use crate::cdn_stage::CdnStage;
use crate::context::ResolverContext;
use crate::error::ResolverError;
use crate::external::ExternalStage;
use crate::http_stage::HttpStage;
use crate::stage::ResolverStage;
use crate::tarball_stage::TarballStage;
use crate::types::{ResolveOutcome, ResolveRequest, StageOutcome};
use crate::vfs_stage::VfsStage;

pub struct ResolverChain {
  stages: Vec<Box<dyn ResolverStage>>,
}

impl Default for ResolverChain {
  fn default() -> Self {
    Self {
      stages: vec![
        Box::new(AliasStage),
        Box::new(ExternalStage),
        Box::new(VfsStage),
        Box::new(TarballStage),
        Box::new(HttpStage),
        Box::new(CdnStage),
      ],
    }
  }
}

impl ResolverChain {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn resolve(
    &self,
    request: &ResolveRequest,
    ctx: &ResolverContext,
  ) -> Result<ResolveOutcome, ResolverError> {
    let mut current = request.clone();
    let mut start = 0;

    loop {
      let mut rewritten = false;
      for stage in self.stages.iter().skip(start) {
        log::trace!("resolver: trying stage {} for {}", stage.name(), current.specifier);
        match stage.resolve(&current, ctx).await? {
          StageOutcome::Resolved(module) => return Ok(ResolveOutcome::Resolved(module)),
          StageOutcome::External(module) => return Ok(ResolveOutcome::External(module)),
          StageOutcome::Rewrite(specifier) => {
            current.specifier = specifier;
            start += 1;
            rewritten = true;
            break;
          }
          StageOutcome::Defer => {
            start += 1;
          }
        }
      }
      if !rewritten {
        break;
      }
    }

    Err(ResolverError::ModuleNotFound { specifier: request.specifier.clone() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::Target;
  use crate::test_support::{empty_context_with_fetcher, make_tarball};
  use crate::types::{ImportKind, Namespace};
  use bytes::Bytes;
  use npmbundle_vfs::{VirtualFileSystem, VirtualPath};

  #[tokio::test]
  async fn simple_reexport_resolves_with_no_network() {
    let (ctx, mock) = empty_context_with_fetcher();
    ctx.vfs.write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"export * from \"/b.tsx\"")).unwrap();
    ctx.vfs.write_dyn(&VirtualPath::new("/b.tsx").unwrap(), Bytes::from_static(b"export const x = 1")).unwrap();

    let chain = ResolverChain::new();
    let req = ResolveRequest {
      specifier: "/b.tsx".to_string(),
      importer: Some(VirtualPath::new("/a.tsx").unwrap()),
      resolve_dir: VirtualPath::new("/").unwrap(),
      kind: ImportKind::ImportStatement,
    };
    match chain.resolve(&req, &ctx).await.unwrap() {
      ResolveOutcome::Resolved(m) => assert_eq!(m.path.as_str(), "/b.tsx"),
      other => panic!("expected Resolved, got {other:?}"),
    }
    assert_eq!(mock.call_count("https://registry.npmjs.org/b.tsx"), 0);
  }

  #[tokio::test]
  async fn bare_package_resolves_through_cdn_stage() {
    let (ctx, mock) = empty_context_with_fetcher();
    mock.serve(
      "https://registry.npmjs.org/camelcase",
      serde_json::json!({
        "name": "camelcase",
        "dist-tags": { "latest": "6.3.0" },
        "versions": {
          "6.3.0": {
            "name": "camelcase",
            "version": "6.3.0",
            "main": "index.js",
            "dist": { "tarball": "https://example.invalid/camelcase-6.3.0.tgz" },
          }
        }
      })
      .to_string(),
    );
    mock.serve(
      "https://example.invalid/camelcase-6.3.0.tgz",
      make_tarball(&[("index.js", "module.exports = s => s;")]),
    );

    let chain = ResolverChain::new();
    let req = ResolveRequest {
      specifier: "camelcase".to_string(),
      importer: None,
      resolve_dir: VirtualPath::new("/").unwrap(),
      kind: ImportKind::ImportStatement,
    };
    match chain.resolve(&req, &ctx).await.unwrap() {
      ResolveOutcome::Resolved(m) => assert_eq!(m.path.as_str(), "/node_modules/camelcase@6.3.0/index.js"),
      other => panic!("expected Resolved, got {other:?}"),
    }

    // A second import of the same package within the build must not
    // re-download the tarball (single-flight + memoized version/manifest).
    let req2 = req.clone();
    chain.resolve(&req2, &ctx).await.unwrap();
    assert_eq!(mock.call_count("https://example.invalid/camelcase-6.3.0.tgz"), 1);
  }

  #[tokio::test]
  async fn node_builtin_externalizes() {
    let (ctx, _mock) = empty_context_with_fetcher();
    let chain = ResolverChain::new();
    let req = ResolveRequest {
      specifier: "node:path".to_string(),
      importer: None,
      resolve_dir: VirtualPath::new("/").unwrap(),
      kind: ImportKind::ImportStatement,
    };
    match chain.resolve(&req, &ctx).await.unwrap() {
      ResolveOutcome::External(m) => assert_eq!(m.path, "node:path"),
      other => panic!("expected External, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn browser_polyfill_rewrite_resolves_via_cdn() {
    let (mut ctx, mock) = empty_context_with_fetcher();
    ctx.target = Target::Browser;
    ctx.polyfill = true;
    mock.serve(
      "https://registry.npmjs.org/path-browserify",
      serde_json::json!({
        "name": "path-browserify",
        "dist-tags": { "latest": "1.0.1" },
        "versions": {
          "1.0.1": {
            "name": "path-browserify",
            "version": "1.0.1",
            "main": "index.js",
            "dist": { "tarball": "https://example.invalid/path-browserify-1.0.1.tgz" },
          }
        }
      })
      .to_string(),
    );
    mock.serve(
      "https://example.invalid/path-browserify-1.0.1.tgz",
      make_tarball(&[("index.js", "module.exports = {};")]),
    );

    let chain = ResolverChain::new();
    let req = ResolveRequest {
      specifier: "node:path".to_string(),
      importer: None,
      resolve_dir: VirtualPath::new("/").unwrap(),
      kind: ImportKind::ImportStatement,
    };
    match chain.resolve(&req, &ctx).await.unwrap() {
      ResolveOutcome::Resolved(m) => assert_eq!(m.path.as_str(), "/node_modules/path-browserify@1.0.1/index.js"),
      other => panic!("expected Resolved, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn unresolvable_bare_specifier_is_module_not_found() {
    let (ctx, mock) = empty_context_with_fetcher();
    mock.fail("https://registry.npmjs.org/does-not-exist", 404);
    let chain = ResolverChain::new();
    let req = ResolveRequest {
      specifier: "does-not-exist".to_string(),
      importer: None,
      resolve_dir: VirtualPath::new("/").unwrap(),
      kind: ImportKind::ImportStatement,
    };
    let err = chain.resolve(&req, &ctx).await.unwrap_err();
    assert_eq!(err.kind(), "ManifestUnavailable");
  }
}
