//! Build Session lifecycle (§4.G): `createContext` -> `build`/`rebuild` ->
//! `cancel` -> `dispose`, plus the `LocalState` memoization caches §3
//! describes. Mirrors the teacher's `cli/tools/test/` test-session object in
//! shape — a long-lived handle wrapping engine + caches that a CLI command
//! drives through a fixed state machine — but scoped to this crate's own
//! bundler lifecycle rather than a test run.

use crate::bootstrap::{self, EngineHandle};
use crate::config::BuildConfig;
use crate::display::human_bytes;
use crate::engine_trait::EngineError;
use crate::error::OrchestratorError;
use crate::events::{global_bus, Notice, Topic};
use npmbundle_builtins::Runtime;
use npmbundle_cdn::CdnSpec;
use npmbundle_pkgcache::{HttpFetcher, PackageMetadataCache, ReqwestFetcher, TarballMountService};
use npmbundle_resolver::{ResolverChain, ResolverContext, Target};
use npmbundle_vfs::{InMemoryFileSystem, VirtualFileSystem};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  Uninitialized,
  Initializing,
  Idle,
  Building,
  Disposed,
}

/// §4.G's `BuildResult`: `{ outputs, contents, packageSizeArr,
/// totalInstallSize, errors, warnings, metafile?, mangleCache? }`. This crate
/// models `mangleCache` as an opaque JSON value since its shape is entirely
/// owned by the engine and never inspected here.
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
  pub outputs: Vec<crate::engine_trait::OutputFile>,
  pub contents: Vec<crate::engine_trait::OutputFile>,
  /// `(name, humanBytes(dist.unpackedSize))` per §4.G — the size column is
  /// pre-formatted for display, matching the teacher's own `human_size`
  /// used for exactly this kind of report (`cli/display.rs`).
  pub package_size_arr: Vec<(String, String)>,
  pub total_install_size: u64,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
  pub metafile: Option<serde_json::Value>,
  pub mangle_cache: Option<serde_json::Value>,
}

fn target_for(platform: &str) -> Target {
  match platform {
    "browser" => Target::Browser,
    "deno" => Target::Runtime(Runtime::Deno),
    "bun" => Target::Runtime(Runtime::Bun),
    _ => Target::Runtime(Runtime::Node),
  }
}

/// A single build/rebuild session. Owns the resolver's shared
/// `ResolverContext` (the §3 `LocalState` caches live there and in
/// `PackageMetadataCache`/`TarballMountService`), the resolver chain, and the
/// engine handle picked at `createContext` time.
pub struct BuildSession {
  state: Mutex<SessionState>,
  cancelling: AtomicBool,
  config: BuildConfig,
  ctx: ResolverContext,
  resolver: ResolverChain,
  engine: EngineHandle,
  /// Monotonically increasing rebuild generation. A superseded rebuild
  /// observes a later generation than the one it started with and bails out
  /// with `Superseded` instead of overwriting newer results.
  generation: std::sync::atomic::AtomicU64,
}

impl std::fmt::Debug for BuildSession {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BuildSession").field("state", &*self.state.lock()).finish_non_exhaustive()
  }
}

impl BuildSession {
  /// `createContext(config)` (§4.G). Accepts an optional pre-populated
  /// filesystem (the public `context(config, filesystem?)` surface's second
  /// argument); defaults to a fresh in-memory VFS.
  pub fn create_context(
    config: BuildConfig,
    filesystem: Option<Arc<dyn VirtualFileSystem>>,
  ) -> Result<Self, OrchestratorError> {
    let cdn = CdnSpec::parse(&config.cdn).map_err(OrchestratorError::from)?;
    let engine = bootstrap::init(&config.init);

    let vfs = filesystem.unwrap_or_else(InMemoryFileSystem::new);
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new());
    let target = target_for(&config.esbuild.platform);

    let ctx = ResolverContext::new(
      vfs,
      target,
      config.polyfill,
      Arc::new(PackageMetadataCache::new()),
      Arc::new(TarballMountService::new()),
      cdn,
      fetcher,
    )
    .with_aliases(config.aliases.clone())
    .with_loader_map(config.esbuild.loader.clone());

    Ok(Self {
      state: Mutex::new(SessionState::Idle),
      cancelling: AtomicBool::new(false),
      config,
      ctx,
      resolver: ResolverChain::new(),
      engine,
      generation: std::sync::atomic::AtomicU64::new(0),
    })
  }

  pub fn state(&self) -> SessionState {
    *self.state.lock()
  }

  fn require_not_disposed(&self) -> Result<(), OrchestratorError> {
    if *self.state.lock() == SessionState::Disposed {
      return Err(OrchestratorError::Disposed);
    }
    Ok(())
  }

  /// `build(config)` (§4.G): one-shot create-run-dispose, the public
  /// `build(config, filesystem?)` surface. `rebuild` is the incremental
  /// sibling for a session created via `create_context`.
  pub async fn one_shot(
    config: BuildConfig,
    filesystem: Option<Arc<dyn VirtualFileSystem>>,
  ) -> Result<BuildResult, OrchestratorError> {
    let session = Self::create_context(config, filesystem)?;
    let result = session.rebuild().await;
    session.dispose();
    result
  }

  /// `rebuild(ctx)` (§4.G). Invalidates per-build caches, preserves
  /// `tarballMounts`/`packageManifests`/`versions`/the VFS, and runs the
  /// engine again. A rebuild already in flight is superseded: its caller
  /// observes `Superseded` rather than a partial result.
  pub async fn rebuild(&self) -> Result<BuildResult, OrchestratorError> {
    self.require_not_disposed()?;
    *self.state.lock() = SessionState::Building;

    let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    self.ctx.clear_per_build_caches();
    self.ctx.pkgcache.clear_negative_caches();

    global_bus().dispatch_event(Topic::BuildStart, serde_json::json!({ "entryPoints": self.config.entry_points }));

    let build_outcome = self.engine.engine.build(&self.config.entry_points, &self.resolver, &self.ctx).await;

    // Consumed exactly once: a cancel requested before or during this build
    // lands here; a cancel that arrives after this point belongs to the
    // *next* rebuild, so the flag must not linger past this check.
    if self.cancelling.swap(false, Ordering::SeqCst) {
      *self.state.lock() = SessionState::Idle;
      global_bus().dispatch_event(Topic::BuildError, serde_json::json!({ "kind": "BuildCancelled" }));
      return Err(OrchestratorError::BuildCancelled);
    }
    if self.generation.load(Ordering::SeqCst) != my_generation {
      return Err(OrchestratorError::Superseded);
    }

    *self.state.lock() = SessionState::Idle;

    let output = match build_outcome {
      Ok(output) => output,
      Err(EngineError::Resolve(err)) => {
        global_bus().dispatch_event(Topic::BuildError, serde_json::json!({ "kind": err.kind() }));
        return Err(OrchestratorError::Resolver(err));
      }
      Err(other) => {
        global_bus().dispatch_event(Topic::BuildError, serde_json::json!({ "cause": other.to_string() }));
        return Err(OrchestratorError::BuildError { cause: other.to_string() });
      }
    };

    if !output.errors.is_empty() {
      let notices: Vec<Notice> = output.errors.iter().map(Notice::error).collect();
      for notice in &notices {
        log::error!("{}", notice.message);
        global_bus().dispatch_event(Topic::BuildError, serde_json::json!({ "message": notice.message }));
      }
      return Err(OrchestratorError::BuildFailed { notices });
    }
    for warning in &output.warnings {
      log::warn!("{warning}");
      global_bus().dispatch_event(Topic::LoggerWarn, serde_json::json!({ "message": warning }));
    }

    let contents: Vec<_> = output.outputs.iter().filter(|o| !o.is_sourcemap && !o.is_binary).cloned().collect();

    let mut package_size_arr = Vec::new();
    let mut total_install_size = 0u64;
    for manifest in self.ctx.pkgcache.all_manifests() {
      let size = manifest.dist.unpacked_size.unwrap_or(0);
      total_install_size += size;
      package_size_arr.push((manifest.name.clone(), human_bytes(size)));
    }

    global_bus().dispatch_event(Topic::BuildEnd, serde_json::json!({ "outputs": output.outputs.len() }));

    Ok(BuildResult {
      outputs: output.outputs,
      contents,
      package_size_arr,
      total_install_size,
      errors: Vec::new(),
      warnings: output.warnings,
      metafile: output.metafile,
      mangle_cache: None,
    })
  }

  /// `cancel(ctx)` (§4.G): idempotent; asks the engine to abort and marks
  /// the in-flight rebuild (if any) as cancelling so it resolves with
  /// `BuildCancelled` rather than its natural result.
  pub fn cancel(&self) {
    self.cancelling.store(true, Ordering::SeqCst);
  }

  /// `dispose(ctx)` (§4.G): tears down the session. Idempotent; repeated
  /// calls are no-ops since `state` is already `Disposed`.
  pub fn dispose(&self) {
    *self.state.lock() = SessionState::Disposed;
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bytes::Bytes;
  use npmbundle_vfs::VirtualPath;

  fn config_with_entry(entry: &str) -> BuildConfig {
    BuildConfig { entry_points: vec![entry.to_string()], ..BuildConfig::default() }
  }

  #[tokio::test]
  async fn simple_reexport_builds_single_output() {
    let vfs = InMemoryFileSystem::new();
    vfs.write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"export * from \"/b.tsx\"")).unwrap();
    vfs.write_dyn(&VirtualPath::new("/b.tsx").unwrap(), Bytes::from_static(b"export const x = 1")).unwrap();

    let session = BuildSession::create_context(config_with_entry("/a.tsx"), Some(vfs)).unwrap();
    let result = session.rebuild().await.unwrap();
    assert_eq!(result.outputs.len(), 1);
    let code = std::str::from_utf8(&result.outputs[0].contents).unwrap();
    assert!(code.contains("export const x = 1"));
    assert!(result.errors.is_empty());
  }

  #[tokio::test]
  async fn rebuild_preserves_memoized_caches_and_clears_negative_ones() {
    let vfs = InMemoryFileSystem::new();
    vfs.write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"export const x = 1")).unwrap();
    let session = BuildSession::create_context(config_with_entry("/a.tsx"), Some(vfs)).unwrap();

    session.rebuild().await.unwrap();
    let versions_before = session.ctx.pkgcache.versions_len();
    session.rebuild().await.unwrap();
    assert!(session.ctx.pkgcache.versions_len() >= versions_before);
    assert_eq!(session.ctx.failed_extension_checks.len(), 0);
  }

  #[tokio::test]
  async fn dispose_rejects_further_rebuilds() {
    let vfs = InMemoryFileSystem::new();
    vfs.write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"export const x = 1")).unwrap();
    let session = BuildSession::create_context(config_with_entry("/a.tsx"), Some(vfs)).unwrap();
    session.dispose();
    let err = session.rebuild().await.unwrap_err();
    assert_eq!(err.kind(), "Disposed");
  }

  #[tokio::test]
  async fn cancel_before_rebuild_completes_is_reported_as_cancelled() {
    let vfs = InMemoryFileSystem::new();
    vfs.write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"export const x = 1")).unwrap();
    let session = BuildSession::create_context(config_with_entry("/a.tsx"), Some(vfs)).unwrap();
    session.cancel();
    let err = session.rebuild().await.unwrap_err();
    assert_eq!(err.kind(), "BuildCancelled");

    // A subsequent rebuild (post-cancel flag reset) succeeds normally.
    let result = session.rebuild().await.unwrap();
    assert!(result.errors.is_empty());
  }

  #[tokio::test]
  async fn package_size_arr_reports_human_readable_sizes() {
    use npmbundle_pkgcache::MockFetcher;
    use semver::Version;

    let vfs = InMemoryFileSystem::new();
    vfs.write_dyn(&VirtualPath::new("/a.tsx").unwrap(), Bytes::from_static(b"export const x = 1")).unwrap();
    let session = BuildSession::create_context(config_with_entry("/a.tsx"), Some(vfs)).unwrap();

    // Populate `packageManifests` directly the same way the Tarball stage
    // would after resolving and mounting a real dependency, so this test
    // doesn't need a network-backed resolve path to exercise the size report.
    let mock = std::sync::Arc::new(MockFetcher::new());
    mock.serve(
      "https://registry.npmjs.org/left-pad",
      serde_json::json!({
        "name": "left-pad",
        "dist-tags": { "latest": "1.3.0" },
        "versions": {
          "1.3.0": {
            "name": "left-pad",
            "version": "1.3.0",
            "dist": { "tarball": "https://example.invalid/left-pad-1.3.0.tgz", "unpackedSize": 12288 },
          },
        },
      })
      .to_string(),
    );
    let fetcher: std::sync::Arc<dyn npmbundle_pkgcache::HttpFetcher> = mock;
    let version = Version::parse("1.3.0").unwrap();
    session.ctx.pkgcache.get_manifest("left-pad", &version, &fetcher).await.unwrap();

    let result = session.rebuild().await.unwrap();
    assert_eq!(result.package_size_arr, vec![("left-pad".to_string(), "12KB".to_string())]);
    assert_eq!(result.total_install_size, 12288);
  }
}
