//! Record schemas — one fixed field set per event kind.
//!
//! Each record is rendered to a single-line JSON string and submitted to the
//! log sink at informational severity. Field names and sets are part of the
//! downstream query contract; do not rename or drop fields.

use serde::Serialize;

/// Thread identifier of the calling thread, captured at call time so that
/// interleaved concurrent events can be cross-referenced downstream.
pub fn current_thread_id() -> String {
    format!("{:?}", std::thread::current().id())
}

/// Announcement of a freshly started logging session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStartRecord {
    pub event_name: String,
    pub session_id: String,
    pub timestamp: String,
    pub thread_id: String,
}

/// One model invocation: request, response, cost, and token usage.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRecord {
    pub invocation_id: String,
    pub client_id: u64,
    pub wrapper_id: u64,
    pub request: serde_json::Value,
    pub response: String,
    pub is_cached: i64,
    pub cost: f64,
    pub start_time: String,
    pub end_time: String,
    pub thread_id: String,
    pub source_name: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

/// A new agent instance registered with the runtime.
#[derive(Debug, Clone, Serialize)]
pub struct NewAgentRecord {
    pub id: u64,
    pub agent_name: String,
    /// Wrapper id of the agent's model client; `null` when the agent has no
    /// client attached.
    pub wrapper_id: Option<u64>,
    pub session_id: String,
    pub current_time: String,
    pub agent_type: String,
    pub thread_id: String,
}

/// A generic named event from an agent or raw-string source.
///
/// `agent_module` / `agent_class` are present only when the source is an
/// agent-like identity.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub source_id: u64,
    pub source_name: String,
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_class: Option<String>,
    /// Safe-serialised event kwargs.
    pub json_state: String,
    pub timestamp: String,
    pub thread_id: String,
}

/// A new model-client wrapper; `json_state` carries init args with
/// credential keys already redacted.
#[derive(Debug, Clone, Serialize)]
pub struct NewWrapperRecord {
    pub wrapper_id: u64,
    pub session_id: String,
    pub json_state: String,
    pub timestamp: String,
    pub thread_id: String,
}

/// A new model client created under a wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct NewClientRecord {
    pub client_id: u64,
    pub wrapper_id: u64,
    pub session_id: String,
    #[serde(rename = "class")]
    pub class_label: String,
    pub json_state: String,
    pub timestamp: String,
    pub thread_id: String,
}

/// A registered function (tool) invocation.
///
/// As in [`EventRecord`], `agent_module` / `agent_class` are present only
/// when the source is an agent-like identity.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionUseRecord {
    pub source_id: u64,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_class: Option<String>,
    pub timestamp: String,
    pub thread_id: String,
    /// Safe-serialised input arguments.
    pub input_args: String,
    /// Safe-serialised return value.
    pub returns: String,
}
