//! Typed configuration layer. Mirrors the teacher's `cli/args/config_file.rs`
//! split between a config struct with documented defaults and the flags/file
//! sources that feed it — here the only source is a `serde_json::Value` an
//! embedder hands in (or a literal `BuildConfig::default()` builder chain),
//! since there is no CLI flag parser or on-disk config file in this crate's
//! scope.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `init.target` platform, §3's `BuildConfig.init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitPlatform {
  Browser,
  Wasm,
  Deno,
  Node,
  Bun,
  Workerd,
  Auto,
}

impl Default for InitPlatform {
  fn default() -> Self {
    InitPlatform::Auto
  }
}

/// Engine bootstrap options (§4.I / §3's `init` field).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
  pub platform: InitPlatform,
  pub version: Option<String>,
  #[serde(rename = "wasmURL")]
  pub wasm_url: Option<String>,
  pub worker: bool,
}

impl Default for InitOptions {
  fn default() -> Self {
    Self { platform: InitPlatform::Auto, version: None, wasm_url: None, worker: false }
  }
}

/// `esbuild` field: opaque engine options forwarded verbatim to the
/// bundler engine. Fields and defaults are bit-exact with `spec.md` §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
  pub target: Vec<String>,
  pub format: String,
  pub platform: String,
  pub bundle: bool,
  pub minify: bool,
  pub tree_shaking: bool,
  pub splitting: bool,
  pub jsx: String,
  pub global_name: String,
  pub log_level: String,
  pub sourcemap: bool,
  pub color: bool,
  pub define: IndexMap<String, String>,
  pub loader: HashMap<String, String>,
}

impl Default for EngineOptions {
  fn default() -> Self {
    let mut define = IndexMap::new();
    define.insert("__NODE__".to_string(), "false".to_string());
    define.insert("process.env.NODE_ENV".to_string(), "\"production\"".to_string());

    let mut loader = HashMap::new();
    loader.insert(".png".to_string(), "file".to_string());
    loader.insert(".jpeg".to_string(), "file".to_string());
    loader.insert(".ttf".to_string(), "file".to_string());
    loader.insert(".svg".to_string(), "text".to_string());
    loader.insert(".html".to_string(), "text".to_string());
    loader.insert(".scss".to_string(), "css".to_string());

    Self {
      target: vec!["esnext".to_string()],
      format: "esm".to_string(),
      platform: "node".to_string(),
      bundle: true,
      minify: true,
      tree_shaking: true,
      splitting: false,
      jsx: "transform".to_string(),
      global_name: "BundledCode".to_string(),
      log_level: "info".to_string(),
      sourcemap: false,
      color: true,
      define,
      loader,
    }
  }
}

/// Output formatting mode for build notices (§4.H / §3's `ansi` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnsiMode {
  Ansi,
  Html,
  None,
}

impl Default for AnsiMode {
  fn default() -> Self {
    AnsiMode::Ansi
  }
}

/// `spec.md` §3's `BuildConfig`. Deserializes from a `serde_json::Value` so
/// an embedder can hand it a JS object marshalled to JSON, with every
/// default matching §6's table exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
  pub entry_points: Vec<String>,
  pub cdn: String,
  pub polyfill: bool,
  pub esbuild: EngineOptions,
  pub init: InitOptions,
  pub ansi: AnsiMode,
  pub aliases: HashMap<String, String>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      entry_points: vec!["/index.tsx".to_string()],
      cdn: "unpkg".to_string(),
      polyfill: false,
      esbuild: EngineOptions::default(),
      init: InitOptions::default(),
      ansi: AnsiMode::default(),
      aliases: HashMap::new(),
    }
  }
}

impl BuildConfig {
  /// Parses a `BuildConfig` out of an embedder-supplied JSON value, applying
  /// every field's documented default for keys the value omits. Unknown top
  /// level keys are accepted (forward-compatibility for `esbuild` passthrough
  /// options this crate doesn't model individually); malformed known fields
  /// surface as `ConfigInvalid`.
  pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
    serde_json::from_value(value)
  }
}
