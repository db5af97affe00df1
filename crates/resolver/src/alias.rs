//! Stage 1: purely syntactic specifier rewrites, user-provided via
//! `BuildConfig`. Always runs first and never itself resolves or
//! externalizes — it only rewrites and defers, so a rewritten specifier
//! still passes through every later stage exactly as if the caller had
//! written it directly.

use crate::context::ResolverContext;
use crate::error::ResolverError;
use crate::stage::ResolverStage;
use crate::types::{ResolveRequest, StageOutcome};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct AliasStage;

#[async_trait]
impl ResolverStage for AliasStage {
  fn name(&self) -> &'static str {
    "alias"
  }

  async fn resolve(
    &self,
    request: &ResolveRequest,
    ctx: &ResolverContext,
  ) -> Result<StageOutcome, ResolverError> {
    match ctx.aliases.get(&request.specifier) {
      Some(target) if target != &request.specifier => Ok(StageOutcome::Rewrite(target.clone())),
      _ => Ok(StageOutcome::Defer),
    }
  }
}
