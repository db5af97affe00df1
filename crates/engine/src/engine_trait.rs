//! The engine seam: `spec.md` §1 calls transpilation semantics a Non-goal
//! "delegated to the underlying bundler engine" — this trait is exactly
//! that delegation boundary. `BuildSession` drives it; it never inspects
//! JS/TS syntax itself beyond what's needed to walk the module graph.

use crate::config::EngineOptions;
use async_trait::async_trait;
use bytes::Bytes;
use npmbundle_resolver::{ResolverChain, ResolverContext, ResolverError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("engine initialization failed: {0}")]
  InitFailed(String),
  #[error(transparent)]
  Resolve(#[from] ResolverError),
  #[error("engine returned a non-empty error list")]
  BuildFailed,
  #[error("transform failed: {0}")]
  TransformFailed(String),
}

/// A single artifact the engine produced. `is_sourcemap`/`is_binary` let
/// `BuildSession::contents()` filter `outputs` down to `contents` per
/// `spec.md` §4.G ("`contents` is `outputs` with sourcemap and binary
/// artifacts filtered out").
#[derive(Debug, Clone)]
pub struct OutputFile {
  pub path: String,
  pub contents: Bytes,
  pub is_sourcemap: bool,
  pub is_binary: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EngineBuildOutput {
  pub outputs: Vec<OutputFile>,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
  pub metafile: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct TransformOutput {
  pub code: String,
  pub map: Option<String>,
  pub warnings: Vec<String>,
}

/// Object-safe so `BuildSession` can hold `Arc<dyn BundlerEngine>` and be
/// driven by a deterministic in-memory double in tests (`MemoryEngine`) or
/// a real esbuild-backed engine in production (`EsbuildEngine`) — the same
/// split the teacher draws between `cli/bundler.rs`'s `Load`/`Resolve`
/// trait objects handed to `swc_bundler` and its production `esbuild_client`
/// dependency.
#[async_trait]
pub trait BundlerEngine: Send + Sync + std::fmt::Debug {
  /// Resolves and bundles `entry_points`, issuing resolve/load callbacks
  /// back into `resolver`/`ctx` for every specifier it encounters — the
  /// "Engine issues resolve/load callbacks to the chain" data flow from
  /// `spec.md` §2.
  async fn build(
    &self,
    entry_points: &[String],
    resolver: &ResolverChain,
    ctx: &ResolverContext,
  ) -> Result<EngineBuildOutput, EngineError>;

  /// Single-file transform with no module resolution, `spec.md` §6's
  /// `transform(input, { engine options }) -> Promise<TransformResult>`.
  /// `options` is the per-call argument from that signature, not the fixed
  /// options an engine instance was constructed with — a caller's
  /// `target`/`format`/`minify`/etc. must reach the transform itself.
  async fn transform(&self, input: &str, loader: &str, options: &EngineOptions) -> Result<TransformOutput, EngineError>;
}
