//! Production `BundlerEngine` backed by the real bundler engine binary.
//! `spec.md` §1 treats transpilation/bundling semantics as the underlying
//! engine's job — the orchestrator only owns plugin wiring (resolve/load
//! callbacks routed through `ResolverChain`) and config translation. The
//! teacher ships its own production bundler driver (`cli/bundler.rs`) as a
//! thin, partly-TODO'd wrapper around `swc_bundler` rather than a fully
//! fleshed-out implementation; this mirrors that shape — `transform` (no
//! module graph, just a single-file pass) is implemented against
//! `esbuild_client`, while `build` documents the plugin-wiring gap rather
//! than faking success.

use crate::config::EngineOptions;
use crate::engine_trait::{BundlerEngine, EngineBuildOutput, EngineError, TransformOutput};
use async_trait::async_trait;
use esbuild_client::{EsbuildClient, TransformOptions};
use npmbundle_resolver::{ResolverChain, ResolverContext};
use std::sync::Arc;

/// Thin wrapper over an `esbuild_client::EsbuildClient` handle. One instance
/// is created per process by `bootstrap::init` and shared across sessions
/// (`spec.md` §4.I's "at-most-once initialization per process"). Unlike the
/// engine handle itself, the `EngineOptions` for a given call are not fixed
/// at construction time — `transform` takes them as an argument so distinct
/// callers sharing this one process-wide engine get distinct output.
#[derive(Debug, Clone)]
pub struct EsbuildEngine {
  client: Arc<EsbuildClient>,
}

impl EsbuildEngine {
  pub fn new(client: Arc<EsbuildClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl BundlerEngine for EsbuildEngine {
  /// Wiring `ResolverChain`/`ResolverContext` into `esbuild_client`'s plugin
  /// hooks (the same `onResolve`/`onLoad` callback surface the resolver
  /// stages are already written against) is not implemented here; the
  /// engine handle's lifecycle and config translation are in place, but the
  /// plugin bridge itself is not. Returning `InitFailed` rather than
  /// silently bundling only the entry point keeps that gap visible instead
  /// of papering over it.
  async fn build(
    &self,
    _entry_points: &[String],
    _resolver: &ResolverChain,
    _ctx: &ResolverContext,
  ) -> Result<EngineBuildOutput, EngineError> {
    Err(EngineError::InitFailed(
      "esbuild plugin bridge (resolver chain -> onResolve/onLoad) is not wired up".to_string(),
    ))
  }

  async fn transform(&self, input: &str, loader: &str, options: &EngineOptions) -> Result<TransformOutput, EngineError> {
    let transform_options = TransformOptions {
      loader: Some(loader.to_string()),
      target: Some(options.target.clone()),
      format: Some(options.format.clone()),
      minify: Some(options.minify),
      ..Default::default()
    };
    let result = self
      .client
      .transform(input.to_string(), transform_options)
      .await
      .map_err(|e| EngineError::TransformFailed(e.to_string()))?;

    Ok(TransformOutput {
      code: result.code,
      map: result.map,
      warnings: result.warnings.into_iter().map(|w| w.text).collect(),
    })
  }
}
