//! Process-wide typed event bus (§4.H) and build-diagnostic formatting.
//! Treated as an explicit singleton with a documented reset hook rather than
//! ambient module state (`spec.md` §9's own note on global state), mirroring
//! how the teacher's `cli/lib/util/logger.rs` installs one global `log::Log`
//! implementation rather than scattering loggers through the call graph.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

/// The fixed topic set from `spec.md` §4.H / §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
  InitLoading,
  InitReady,
  LoggerLog,
  LoggerInfo,
  LoggerWarn,
  LoggerError,
  BuildStart,
  BuildEnd,
  BuildError,
  TransformError,
}

impl Topic {
  pub fn as_str(self) -> &'static str {
    match self {
      Topic::InitLoading => "INIT_LOADING",
      Topic::InitReady => "INIT_READY",
      Topic::LoggerLog => "LOGGER_LOG",
      Topic::LoggerInfo => "LOGGER_INFO",
      Topic::LoggerWarn => "LOGGER_WARN",
      Topic::LoggerError => "LOGGER_ERROR",
      Topic::BuildStart => "BUILD_START",
      Topic::BuildEnd => "BUILD_END",
      Topic::BuildError => "BUILD_ERROR",
      Topic::TransformError => "TRANSFORM_ERROR",
    }
  }
}

pub type EventCallback = Box<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Severity of a single build diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Warning,
  Error,
}

/// A single build diagnostic. Formatted into either ANSI-colored text or
/// HTML markup; selection follows `BuildConfig.ansi` (`AnsiMode`).
#[derive(Debug, Clone)]
pub struct Notice {
  pub level: NoticeLevel,
  pub message: String,
  pub location: Option<String>,
}

impl Notice {
  pub fn warning(message: impl Into<String>) -> Self {
    Self { level: NoticeLevel::Warning, message: message.into(), location: None }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { level: NoticeLevel::Error, message: message.into(), location: None }
  }

  pub fn with_location(mut self, location: impl Into<String>) -> Self {
    self.location = Some(location.into());
    self
  }

  /// ANSI-colored terminal text: red for errors, yellow for warnings.
  pub fn to_ansi(&self) -> String {
    let code = match self.level {
      NoticeLevel::Error => "31",
      NoticeLevel::Warning => "33",
    };
    let label = match self.level {
      NoticeLevel::Error => "error",
      NoticeLevel::Warning => "warning",
    };
    match &self.location {
      Some(loc) => format!("\x1b[{code}m{label}\x1b[0m: {} ({loc})", self.message),
      None => format!("\x1b[{code}m{label}\x1b[0m: {}", self.message),
    }
  }

  /// HTML markup equivalent, for embedders rendering build diagnostics in a
  /// browser panel rather than a terminal.
  pub fn to_html(&self) -> String {
    let class = match self.level {
      NoticeLevel::Error => "notice notice-error",
      NoticeLevel::Warning => "notice notice-warning",
    };
    let label = match self.level {
      NoticeLevel::Error => "error",
      NoticeLevel::Warning => "warning",
    };
    match &self.location {
      Some(loc) => format!(
        "<div class=\"{class}\"><b>{label}</b>: {} <code>({loc})</code></div>",
        html_escape(&self.message)
      ),
      None => format!("<div class=\"{class}\"><b>{label}</b>: {}</div>", html_escape(&self.message)),
    }
  }

  pub fn format(&self, mode: crate::config::AnsiMode) -> String {
    match mode {
      crate::config::AnsiMode::Ansi => self.to_ansi(),
      crate::config::AnsiMode::Html => self.to_html(),
      crate::config::AnsiMode::None => match &self.location {
        Some(loc) => format!("{:?}: {} ({loc})", self.level, self.message),
        None => format!("{:?}: {}", self.level, self.message),
      },
    }
  }
}

fn html_escape(input: &str) -> String {
  input.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Pub/sub for build progress and diagnostics. Dispatch is synchronous
/// fan-out over whatever subscribers are registered for a topic at the time
/// of the call; a subscriber that panics is caught and reported to
/// `LOGGER_ERROR` instead of aborting the remaining subscribers.
#[derive(Default)]
pub struct EventBus {
  subscribers: RwLock<HashMap<Topic, Vec<EventCallback>>>,
}

impl EventBus {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_event_listener(&self, topic: Topic, callback: EventCallback) {
    self.subscribers.write().entry(topic).or_default().push(callback);
  }

  pub fn dispatch_event(&self, topic: Topic, payload: serde_json::Value) {
    let guard = self.subscribers.read();
    let Some(callbacks) = guard.get(&topic) else { return };
    for callback in callbacks {
      if catch_unwind(AssertUnwindSafe(|| callback(&payload))).is_err() {
        log::error!("event subscriber for topic {} panicked", topic.as_str());
      }
    }
  }

  /// Test/embedder reset hook: clears every subscriber on this bus.
  pub fn clear(&self) {
    self.subscribers.write().clear();
  }
}

static GLOBAL_BUS: OnceLock<EventBus> = OnceLock::new();

/// The process-wide event bus. Lazily created on first use.
pub fn global_bus() -> &'static EventBus {
  GLOBAL_BUS.get_or_init(EventBus::new)
}

/// Clears every subscriber on the process-wide bus. Exists so test suites
/// (and long-lived embedders recycling sessions) get a documented reset
/// point instead of relying on process restart.
pub fn reset_global_bus() {
  global_bus().clear();
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  #[test]
  fn dispatch_fans_out_to_all_subscribers() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
      let count = count.clone();
      bus.add_event_listener(
        Topic::BuildStart,
        Box::new(move |_| {
          count.fetch_add(1, Ordering::SeqCst);
        }),
      );
    }
    bus.dispatch_event(Topic::BuildStart, serde_json::json!({}));
    assert_eq!(count.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn panicking_subscriber_does_not_abort_dispatch() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    bus.add_event_listener(Topic::BuildEnd, Box::new(|_| panic!("boom")));
    {
      let count = count.clone();
      bus.add_event_listener(
        Topic::BuildEnd,
        Box::new(move |_| {
          count.fetch_add(1, Ordering::SeqCst);
        }),
      );
    }
    bus.dispatch_event(Topic::BuildEnd, serde_json::json!({}));
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn notice_formats_ansi_and_html() {
    let notice = Notice::error("module not found").with_location("/a.ts:1:1");
    assert!(notice.to_ansi().contains("\x1b[31m"));
    assert!(notice.to_html().contains("notice-error"));
  }

  #[test]
  fn topic_strings_match_spec() {
    assert_eq!(Topic::InitLoading.as_str(), "INIT_LOADING");
    assert_eq!(Topic::TransformError.as_str(), "TRANSFORM_ERROR");
  }
}
