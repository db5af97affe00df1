//! Public programmatic surface (`spec.md` §6): `build`/`context`/`rebuild`/
//! `cancel`/`dispose` drive one `BuildSession`; `transform` runs a single
//! file through the engine with no module resolution; `set_file`/`get_file`
//! read and write the virtual filesystem a session is built against.

pub use npmbundle_builtins as builtins;
pub use npmbundle_cdn as cdn;
pub use npmbundle_engine::{
  global_bus, reset_global_bus, AnsiMode, BuildConfig, BuildResult, BuildSession, BundlerEngine, DetectedPlatform,
  EngineBuildOutput, EngineError, EngineHandle, EngineOptions, EsbuildEngine, EventBus, EventCallback, InitOptions,
  InitPlatform, MemoryEngine, Notice, NoticeLevel, OrchestratorError, OutputFile, SessionState, Topic,
  TransformOutput,
};
pub use npmbundle_pkgcache as pkgcache;
pub use npmbundle_resolver as resolver;
pub use npmbundle_vfs::{InMemoryFileSystem, VfsError, VirtualFile, VirtualFileSystem, VirtualPath};

use std::sync::Arc;

/// `TheFileSystem` (§6): the VFS handle a `BuildConfig`/`BuildContext` is
/// built against. An opaque `Arc<dyn VirtualFileSystem>` rather than a
/// concrete backend so callers can swap `InMemoryFileSystem` for a
/// disk-backed one without touching the rest of this surface.
pub type TheFileSystem = Arc<dyn VirtualFileSystem>;

/// `context(config, filesystem?) -> Promise<BuildContext>` (§6). The
/// returned handle is what `rebuild`/`cancel`/`dispose` operate on.
pub type BuildContext = BuildSession;

/// `context(config, filesystem?)`.
pub async fn context(
  config: BuildConfig,
  filesystem: Option<TheFileSystem>,
) -> Result<BuildContext, OrchestratorError> {
  BuildSession::create_context(config, filesystem)
}

/// `build(config, filesystem?)`: one-shot create-run-dispose.
pub async fn build(
  config: BuildConfig,
  filesystem: Option<TheFileSystem>,
) -> Result<BuildResult, OrchestratorError> {
  BuildSession::one_shot(config, filesystem).await
}

/// `rebuild(ctx)`.
pub async fn rebuild(ctx: &BuildContext) -> Result<BuildResult, OrchestratorError> {
  ctx.rebuild().await
}

/// `cancel(ctx)`. Idempotent.
pub async fn cancel(ctx: &BuildContext) -> Result<(), OrchestratorError> {
  ctx.cancel();
  Ok(())
}

/// `dispose(ctx)`. Idempotent; further use of `ctx` fails with `Disposed`.
pub async fn dispose(ctx: &BuildContext) -> Result<(), OrchestratorError> {
  ctx.dispose();
  Ok(())
}

/// `transform(input, { engine options }) -> Promise<TransformResult>` (§6):
/// single-file transform with no module resolution. Boots the process-wide
/// engine with the platform named in `options.init` (or `auto`) if it has
/// not already been initialized.
pub async fn transform(input: &str, loader: &str, options: &EngineOptions) -> Result<TransformOutput, OrchestratorError> {
  let handle = npmbundle_engine::init(&InitOptions::default());
  handle
    .engine
    .transform(input, loader, options)
    .await
    .map_err(|e| OrchestratorError::EngineInitFailed { reason: e.to_string() })
}

/// `setFile(fs, path, contents)` (§6).
pub fn set_file(fs: &TheFileSystem, path: &VirtualPath, contents: impl Into<bytes::Bytes>) -> Result<(), VfsError> {
  fs.write_dyn(path, contents.into())
}

/// `getFile(fs, path, encoding)` (§6). `encoding = "utf8"` decodes to a
/// `String`; any other value (or omission) returns raw bytes.
pub fn get_file(fs: &TheFileSystem, path: &VirtualPath, encoding: Option<&str>) -> Result<Vec<u8>, VfsError> {
  match encoding {
    Some("utf8") | Some("utf-8") => fs.read_string(path).map(String::into_bytes),
    _ => fs.read(path).map(|b| b.to_vec()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn s1_simple_reexport_produces_single_output_with_no_network() {
    let fs: TheFileSystem = InMemoryFileSystem::new();
    set_file(&fs, &VirtualPath::new("/a.tsx").unwrap(), "export * from \"/b.tsx\"").unwrap();
    set_file(&fs, &VirtualPath::new("/b.tsx").unwrap(), "export const x = 1").unwrap();

    let config = BuildConfig { entry_points: vec!["/a.tsx".to_string()], ..BuildConfig::default() };
    let result = build(config, Some(fs)).await.unwrap();

    assert_eq!(result.outputs.len(), 1);
    let contents = std::str::from_utf8(&result.outputs[0].contents).unwrap();
    assert!(contents.contains("export const x = 1"));
  }

  #[tokio::test]
  async fn get_file_decodes_utf8_when_requested() {
    let fs: TheFileSystem = InMemoryFileSystem::new();
    let path = VirtualPath::new("/x.txt").unwrap();
    set_file(&fs, &path, "hello").unwrap();
    let decoded = get_file(&fs, &path, Some("utf8")).unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "hello");
  }

  #[tokio::test]
  async fn cancel_then_rebuild_reports_cancelled_then_recovers() {
    let fs: TheFileSystem = InMemoryFileSystem::new();
    set_file(&fs, &VirtualPath::new("/a.tsx").unwrap(), "export const x = 1").unwrap();
    let config = BuildConfig { entry_points: vec!["/a.tsx".to_string()], ..BuildConfig::default() };
    let ctx = context(config, Some(fs)).await.unwrap();

    cancel(&ctx).await.unwrap();
    let err = rebuild(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), "BuildCancelled");

    let result = rebuild(&ctx).await.unwrap();
    assert!(result.errors.is_empty());

    dispose(&ctx).await.unwrap();
    let err = rebuild(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), "Disposed");
  }
}
