//! Build session lifecycle, event/notice bus, configuration, and engine
//! bootstrap — the orchestrator layer that sits on top of the resolver
//! chain (`npmbundle_resolver`) and drives a `BundlerEngine` through a
//! build/rebuild/cancel/dispose lifecycle.

mod bootstrap;
mod config;
mod display;
mod engine_trait;
mod error;
mod esbuild_engine;
mod events;
mod memory_engine;
mod session;

pub use bootstrap::{detect_platform, init, DetectedPlatform, EngineHandle};
pub use config::{AnsiMode, BuildConfig, EngineOptions, InitOptions, InitPlatform};
pub use display::human_bytes;
pub use engine_trait::{BundlerEngine, EngineBuildOutput, EngineError, OutputFile, TransformOutput};
pub use error::OrchestratorError;
pub use esbuild_engine::EsbuildEngine;
pub use events::{global_bus, reset_global_bus, EventBus, EventCallback, Notice, NoticeLevel, Topic};
pub use memory_engine::MemoryEngine;
pub use session::{BuildResult, BuildSession, SessionState};
