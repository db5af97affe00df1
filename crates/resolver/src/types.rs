use npmbundle_pkgcache::SideEffectsDecl;
use npmbundle_vfs::VirtualPath;

/// How the engine is asking the chain to resolve a specifier. Mirrors
/// esbuild's `ResolveKind` closely enough for the chain's purposes: entry
/// points and statement imports behave identically here, dynamic import and
/// require only matter to the engine's own code generation, not to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
  EntryPoint,
  ImportStatement,
  RequireCall,
  DynamicImport,
}

/// Which namespace a resolved path belongs to; selects which loader reads
/// its bytes. `External` paths carry no namespace — the engine leaves them
/// unbundled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
  Vfs,
  Http,
}

impl Namespace {
  pub fn as_str(self) -> &'static str {
    match self {
      Namespace::Vfs => "vfs",
      Namespace::Http => "http-url",
    }
  }
}

#[derive(Debug, Clone)]
pub struct ResolveRequest {
  pub specifier: String,
  pub importer: Option<VirtualPath>,
  pub resolve_dir: VirtualPath,
  pub kind: ImportKind,
}

#[derive(Debug, Clone)]
pub struct ResolvedModule {
  pub path: VirtualPath,
  pub namespace: Namespace,
  pub loader: String,
  pub side_effects: Option<SideEffectsDecl>,
}

#[derive(Debug, Clone)]
pub struct ExternalModule {
  pub path: String,
}

/// What a single stage decided about a request.
#[derive(Debug, Clone)]
pub enum StageOutcome {
  Resolved(ResolvedModule),
  External(ExternalModule),
  /// Rewrites the specifier in place and continues to the *next* stage —
  /// used by Alias (user rewrites) and External (polyfill substitution).
  Rewrite(String),
  /// Not this stage's concern; try the next one.
  Defer,
}

/// What the whole chain decided, after trying every stage in order.
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
  Resolved(ResolvedModule),
  External(ExternalModule),
}
