//! Ordered resolver chain driving the Build Session's resolve/load
//! callbacks: alias -> external -> vfs -> tarball (mounted package) -> http
//! -> cdn. See `chain::ResolverChain` for the driver and `stage.rs` for the
//! per-stage contract every stage below implements.

mod alias;
mod cdn_stage;
mod chain;
mod context;
mod deps;
mod error;
mod external;
mod http_stage;
mod stage;
mod tarball_stage;
mod types;
mod vfs_stage;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use chain::ResolverChain;
pub use context::{ResolverContext, Target};
pub use error::ResolverError;
pub use stage::ResolverStage;
pub use types::{
  ExternalModule, ImportKind, Namespace, ResolveOutcome, ResolveRequest, ResolvedModule, StageOutcome,
};
