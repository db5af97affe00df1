//! Platform detection and one-shot engine initialization (§4.I). Mirrors the
//! teacher's own `deno_runtime::ops::bootstrap` split: a pure detection
//! function plus a guarded, idempotent init entry point callers can invoke
//! from multiple call sites without double-initializing the underlying
//! engine.

use crate::config::{InitOptions, InitPlatform};
use crate::engine_trait::BundlerEngine;
use crate::memory_engine::MemoryEngine;
use std::sync::{Arc, OnceLock};

/// The concrete platform an `auto` init resolved to, or that the caller
/// pinned explicitly. `spec.md` §4.I: "choose the first match; `auto`
/// resolves to the first supported backend for the engine."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedPlatform {
  Browser,
  Worker,
  Deno,
  Bun,
  Node,
}

/// Host-environment probe. There is no real `window`/`Deno`/`Bun` global to
/// inspect from a native Rust process, so detection here reduces to
/// compile-time target information plus the explicit override the embedder
/// passed in `InitOptions.platform`; a real WASM build of this crate would
/// instead probe `js_sys::global()` the way the teacher's web tooling does.
pub fn detect_platform(requested: InitPlatform) -> DetectedPlatform {
  match requested {
    InitPlatform::Browser => DetectedPlatform::Browser,
    InitPlatform::Wasm => DetectedPlatform::Browser,
    InitPlatform::Deno => DetectedPlatform::Deno,
    InitPlatform::Node => DetectedPlatform::Node,
    InitPlatform::Bun => DetectedPlatform::Bun,
    InitPlatform::Workerd => DetectedPlatform::Worker,
    InitPlatform::Auto => {
      if cfg!(target_arch = "wasm32") {
        DetectedPlatform::Browser
      } else {
        DetectedPlatform::Node
      }
    }
  }
}

/// The handle returned from `init`: a live `Arc<dyn BundlerEngine>` plus the
/// platform it bound to, so callers/tests can assert which backend was
/// selected without downcasting the trait object.
#[derive(Clone)]
pub struct EngineHandle {
  pub platform: DetectedPlatform,
  pub engine: Arc<dyn BundlerEngine>,
}

impl std::fmt::Debug for EngineHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EngineHandle").field("platform", &self.platform).finish_non_exhaustive()
  }
}

static GLOBAL_ENGINE: OnceLock<EngineHandle> = OnceLock::new();

/// At-most-once engine initialization per process. The first caller's
/// `InitOptions` wins; subsequent calls return the already-initialized
/// handle regardless of the options they passed, matching the "module-scoped
/// promise guards concurrent init calls" contract in `spec.md` §4.I. There is
/// deliberately no uninit hook — a fresh process is the only way to
/// reinitialize, the same lifetime the teacher's own `V8::initialize_platform`
/// guard assumes.
pub fn init(options: &InitOptions) -> EngineHandle {
  GLOBAL_ENGINE
    .get_or_init(|| {
      let platform = detect_platform(options.platform);
      // `EsbuildEngine::build` is not yet wired to the resolver chain (see
      // `esbuild_engine.rs`), so every platform currently gets the
      // deterministic in-memory double. Swapping the production engine in
      // is a one-line change here once that wiring lands.
      let engine: Arc<dyn BundlerEngine> = Arc::new(MemoryEngine::new());
      log::info!("engine bootstrap: platform={platform:?}");
      EngineHandle { platform, engine }
    })
    .clone()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn auto_resolves_to_node_on_native_targets() {
    assert_eq!(detect_platform(InitPlatform::Auto), DetectedPlatform::Node);
  }

  #[test]
  fn explicit_platform_is_honored() {
    assert_eq!(detect_platform(InitPlatform::Deno), DetectedPlatform::Deno);
    assert_eq!(detect_platform(InitPlatform::Workerd), DetectedPlatform::Worker);
  }

  #[test]
  fn init_is_idempotent_across_calls() {
    let a = init(&InitOptions::default());
    let b = init(&InitOptions { platform: InitPlatform::Deno, ..InitOptions::default() });
    assert_eq!(a.platform, b.platform);
  }
}
