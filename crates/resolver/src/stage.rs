use crate::context::ResolverContext;
use crate::error::ResolverError;
use crate::types::{ResolveRequest, StageOutcome};
use async_trait::async_trait;

/// One link of the resolver chain. Stages are tried in order; the first to
/// return anything other than `Defer` short-circuits the rest, matching
/// `spec.md` §4.F's "a stage that returns a hit short-circuits; a stage that
/// returns not-mine defers" rule.
#[async_trait]
pub trait ResolverStage: Send + Sync {
  fn name(&self) -> &'static str;

  async fn resolve(
    &self,
    request: &ResolveRequest,
    ctx: &ResolverContext,
  ) -> Result<StageOutcome, ResolverError>;
}
