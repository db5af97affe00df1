//! Stage 2: Runtime-Builtin Registry consultation. Natively-supported
//! builtins become external; browser targets with `polyfill = true` get
//! rewritten to the mapped polyfill package and fall through to the
//! remaining stages (which resolve it like any other bare specifier).

use crate::context::{ResolverContext, Target};
use crate::error::ResolverError;
use crate::stage::ResolverStage;
use crate::types::{ExternalModule, ResolveRequest, StageOutcome};
use async_trait::async_trait;
use npmbundle_builtins as builtins;

#[derive(Debug, Default)]
pub struct ExternalStage;

#[async_trait]
impl ResolverStage for ExternalStage {
  fn name(&self) -> &'static str {
    "external"
  }

  async fn resolve(
    &self,
    request: &ResolveRequest,
    ctx: &ResolverContext,
  ) -> Result<StageOutcome, ResolverError> {
    let Some(info) = builtins::get_builtin_info(&request.specifier) else {
      return Ok(StageOutcome::Defer);
    };

    if let Target::Runtime(runtime) = ctx.target {
      let supported = match runtime {
        builtins::Runtime::Node => info.node,
        builtins::Runtime::Deno => info.deno,
        builtins::Runtime::Bun => info.bun,
      };
      if matches!(supported, builtins::Support::Yes) {
        log::debug!("external: {} is native on this runtime", request.specifier);
        return Ok(StageOutcome::External(ExternalModule { path: builtins::normalize(&request.specifier) }));
      }
    }

    if matches!(ctx.target, Target::Browser) && ctx.polyfill {
      if let Some(polyfill_pkg) = builtins::get_polyfill(&request.specifier) {
        log::debug!("external: polyfilling {} -> {polyfill_pkg}", request.specifier);
        return Ok(StageOutcome::Rewrite(polyfill_pkg.to_string()));
      }
    }

    Ok(StageOutcome::Defer)
  }
}
