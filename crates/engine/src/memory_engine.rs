//! A deterministic, in-process `BundlerEngine` double. It does not transpile
//! TypeScript/JSX or tree-shake — `spec.md` §1 calls that the underlying
//! bundler engine's job — it only walks the module graph the same way the
//! real engine would (issuing `resolve` calls back into the chain for every
//! static import it finds) and concatenates resolved bodies in dependency
//! order. Exists so the orchestrator's own lifecycle/caching/resolver logic
//! has something to drive in tests without linking a real esbuild binary,
//! mirroring the teacher's own practice of running `cli/tests` against an
//! in-process `TestServer` rather than the network.

use crate::config::EngineOptions;
use crate::engine_trait::{BundlerEngine, EngineBuildOutput, EngineError, OutputFile, TransformOutput};
use async_trait::async_trait;
use bytes::Bytes;
use npmbundle_resolver::{ImportKind, ResolveOutcome, ResolveRequest, ResolverChain, ResolverContext};
use npmbundle_vfs::VirtualPath;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn import_patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS.get_or_init(|| {
    vec![
      // import ... from "spec"; export ... from "spec"; export * from "spec"
      Regex::new(r#"(?:from|import)\s+["']([^"']+)["']"#).unwrap(),
      // bare side-effect import: import "spec"
      Regex::new(r#"(?m)^\s*import\s+["']([^"']+)["']"#).unwrap(),
      // require("spec")
      Regex::new(r#"require\(\s*["']([^"']+)["']\s*\)"#).unwrap(),
      // dynamic import("spec")
      Regex::new(r#"import\(\s*["']([^"']+)["']\s*\)"#).unwrap(),
    ]
  })
}

fn extract_specifiers(source: &str) -> Vec<String> {
  let mut found = Vec::new();
  let mut seen = HashSet::new();
  for pattern in import_patterns() {
    for cap in pattern.captures_iter(source) {
      let spec = cap[1].to_string();
      if seen.insert(spec.clone()) {
        found.push(spec);
      }
    }
  }
  found
}

/// Deterministic in-memory engine double. Holds no state of its own; every
/// call is a pure function of the VFS contents reachable from `entry_points`.
#[derive(Debug, Default)]
pub struct MemoryEngine;

impl MemoryEngine {
  pub fn new() -> Self {
    Self
  }

  /// Depth-first walk from `path`, visiting each resolved module exactly
  /// once and appending its body to `output` *after* its dependencies' (so
  /// concatenation order matches evaluation order for a simple reexport
  /// chain). Builtin/externalized specifiers contribute no body.
  #[allow(clippy::too_many_arguments)]
  async fn walk(
    &self,
    path: &VirtualPath,
    resolver: &ResolverChain,
    ctx: &ResolverContext,
    visited: &mut HashSet<String>,
    output: &mut Vec<OutputFile>,
    errors: &mut Vec<String>,
  ) {
    if !visited.insert(path.as_str().to_string()) {
      return;
    }
    let body = match ctx.vfs.read_string(path) {
      Ok(body) => body,
      Err(err) => {
        errors.push(format!("{}: {err}", path.as_str()));
        return;
      }
    };

    for specifier in extract_specifiers(&body) {
      let request = ResolveRequest {
        specifier,
        importer: Some(path.clone()),
        resolve_dir: path.join("..").unwrap_or_else(|_| path.clone()),
        kind: ImportKind::ImportStatement,
      };
      match resolver.resolve(&request, ctx).await {
        Ok(ResolveOutcome::Resolved(module)) => {
          Box::pin(self.walk(&module.path, resolver, ctx, visited, output, errors)).await;
        }
        Ok(ResolveOutcome::External(_)) => {
          // externals carry no body in the bundle; the real engine emits an
          // import statement referencing them instead.
        }
        Err(err) => errors.push(format!("{} (imported from {}): {err}", request.specifier, path.as_str())),
      }
    }

    output.push(OutputFile {
      path: path.as_str().to_string(),
      contents: Bytes::from(body.into_bytes()),
      is_sourcemap: false,
      is_binary: false,
    });
  }
}

#[async_trait]
impl BundlerEngine for MemoryEngine {
  async fn build(
    &self,
    entry_points: &[String],
    resolver: &ResolverChain,
    ctx: &ResolverContext,
  ) -> Result<EngineBuildOutput, EngineError> {
    let mut visited = HashSet::new();
    let mut modules = Vec::new();
    let mut errors = Vec::new();

    for entry in entry_points {
      let resolve_dir = VirtualPath::new("/").map_err(|e| EngineError::InitFailed(e.to_string()))?;
      let request = ResolveRequest {
        specifier: entry.clone(),
        importer: None,
        resolve_dir,
        kind: ImportKind::EntryPoint,
      };
      match resolver.resolve(&request, ctx).await {
        Ok(ResolveOutcome::Resolved(module)) => {
          self.walk(&module.path, resolver, ctx, &mut visited, &mut modules, &mut errors).await;
        }
        Ok(ResolveOutcome::External(ext)) => {
          errors.push(format!("entry point {entry} resolved to an external module: {}", ext.path));
        }
        Err(err) => return Err(EngineError::Resolve(err)),
      }
    }

    if !errors.is_empty() {
      return Ok(EngineBuildOutput { outputs: Vec::new(), errors, warnings: Vec::new(), metafile: None });
    }

    let mut bundle = String::new();
    for module in &modules {
      bundle.push_str(std::str::from_utf8(&module.contents).unwrap_or_default());
      bundle.push('\n');
    }

    Ok(EngineBuildOutput {
      outputs: vec![OutputFile {
        path: "/out.js".to_string(),
        contents: Bytes::from(bundle.into_bytes()),
        is_sourcemap: false,
        is_binary: false,
      }],
      errors: Vec::new(),
      warnings: Vec::new(),
      metafile: None,
    })
  }

  async fn transform(&self, input: &str, _loader: &str, _options: &EngineOptions) -> Result<TransformOutput, EngineError> {
    Ok(TransformOutput { code: input.to_string(), map: None, warnings: Vec::new() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use npmbundle_resolver::test_support::empty_context_with_fetcher;
  use npmbundle_vfs::VirtualFileSystem;

  #[tokio::test]
  async fn simple_reexport_bundles_single_module_chain() {
    let (ctx, _mock) = empty_context_with_fetcher();
    ctx
      .vfs
      .write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"export * from \"/b.tsx\""))
      .unwrap();
    ctx
      .vfs
      .write_dyn(&VirtualPath::new("/b.tsx").unwrap(), Bytes::from_static(b"export const x = 1"))
      .unwrap();

    let resolver = ResolverChain::new();
    let engine = MemoryEngine::new();
    let output = engine.build(&["/a.tsx".to_string()], &resolver, &ctx).await.unwrap();

    assert_eq!(output.outputs.len(), 1);
    let code = std::str::from_utf8(&output.outputs[0].contents).unwrap();
    assert!(code.contains("export const x = 1"));
    assert!(output.errors.is_empty());
  }

  #[tokio::test]
  async fn cyclic_imports_terminate_via_visited_set() {
    let (ctx, _mock) = empty_context_with_fetcher();
    ctx
      .vfs
      .write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"import \"/b.tsx\"\nexport const a = 1"))
      .unwrap();
    ctx
      .vfs
      .write_dyn(&VirtualPath::new("/b.tsx").unwrap(), Bytes::from_static(b"import \"/a.tsx\"\nexport const b = 2"))
      .unwrap();

    let resolver = ResolverChain::new();
    let engine = MemoryEngine::new();
    let output = engine.build(&["/a.tsx".to_string()], &resolver, &ctx).await.unwrap();
    assert_eq!(output.outputs.len(), 1);
    let code = std::str::from_utf8(&output.outputs[0].contents).unwrap();
    assert!(code.contains("export const a = 1"));
    assert!(code.contains("export const b = 2"));
  }

  #[tokio::test]
  async fn unresolvable_entry_point_surfaces_as_resolve_error() {
    let (ctx, mock) = empty_context_with_fetcher();
    mock.fail("https://registry.npmjs.org/does-not-exist", 404);
    let resolver = ResolverChain::new();
    let engine = MemoryEngine::new();
    let err = engine.build(&["does-not-exist".to_string()], &resolver, &ctx).await.unwrap_err();
    assert!(matches!(err, EngineError::Resolve(_)));
  }

  #[tokio::test]
  async fn transform_is_a_passthrough() {
    let engine = MemoryEngine::new();
    let out = engine.transform("const x = 1", "js", &EngineOptions::default()).await.unwrap();
    assert_eq!(out.code, "const x = 1");
  }
}
