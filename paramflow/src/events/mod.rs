//! Lifecycle events.
//!
//! Pipelines and chains report what happened to an [`EventSink`]. A sink can
//! be attached to a pipeline directly; otherwise the process-wide sink is
//! used, which defaults to [`NoOpEventSink`].

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use crate::utils::iso_timestamp;
use parking_lot::RwLock;
use std::sync::Arc;

/// Event types emitted by the engine.
pub mod types {
    /// A pipeline invocation started.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// A pipeline invocation succeeded.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// A pipeline invocation ended with an error result.
    pub const PIPELINE_FAILED: &str = "pipeline.failed";
    /// Business logic interrupted the invocation.
    pub const PIPELINE_INTERRUPTED: &str = "pipeline.interrupted";
    /// The fallback handler was invoked.
    pub const PIPELINE_FALLBACK: &str = "pipeline.fallback";
    /// A chain step was skipped by its condition.
    pub const CHAIN_STEP_SKIPPED: &str = "chain.step.skipped";
    /// A chain stopped at a failing step.
    pub const CHAIN_ABORTED: &str = "chain.aborted";
}

static GLOBAL_EVENT_SINK: RwLock<Option<Arc<dyn EventSink>>> = RwLock::new(None);

/// Sets the process-wide event sink.
pub fn set_event_sink(sink: Arc<dyn EventSink>) {
    *GLOBAL_EVENT_SINK.write() = Some(sink);
}

/// Clears the process-wide event sink.
pub fn clear_event_sink() {
    *GLOBAL_EVENT_SINK.write() = None;
}

/// Gets the process-wide event sink.
///
/// Returns a `NoOpEventSink` if no sink is set.
pub fn get_event_sink() -> Arc<dyn EventSink> {
    GLOBAL_EVENT_SINK
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(NoOpEventSink))
}

/// Emits `event_type` with `data` stamped with the current time.
///
/// Object payloads gain a `timestamp` key; other payloads are wrapped as
/// `{"data": .., "timestamp": ..}`.
pub fn emit_stamped(sink: &dyn EventSink, event_type: &str, data: serde_json::Value) {
    let payload = match data {
        serde_json::Value::Object(mut map) => {
            map.insert("timestamp".to_string(), iso_timestamp().into());
            serde_json::Value::Object(map)
        }
        other => serde_json::json!({ "data": other, "timestamp": iso_timestamp() }),
    };
    sink.try_emit(event_type, Some(payload));
}
