//! [`OtelLogger`]: the instrumentation adapter for a multi-agent runtime.
//!
//! One instance per logging session. Every public operation converts a host
//! event into a structured JSON log record and, where applicable, a tracing
//! span, then returns — failures are contained by the fault guard and
//! reported on the error channel, never surfaced to the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::emit::{LogEmitter, LogSink};
use crate::error::TelemetryError;
use crate::guard::guard;
use crate::payload::{redact, safe_serialize, Payload};
use crate::record::{
    current_thread_id, ChatCompletionRecord, EventRecord, FunctionUseRecord, NewAgentRecord,
    NewClientRecord, NewWrapperRecord, SessionStartRecord,
};
use crate::session::SessionId;
use crate::source::{Source, UNKNOWN_SOURCE};
use crate::span::{AttrValue, SpanRecorder, SpanSink};
use crate::timestamp::current_timestamp;

/// Init-arg keys stripped from wrapper records before they are logged.
pub const REDACTED_WRAPPER_KEYS: &[&str] = &[
    "api_key",
    "organization",
    "base_url",
    "azure_endpoint",
    "azure_ad_token",
    "azure_ad_token_provider",
];

/// Token usage reported by a model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

/// A model response as seen by the instrumentation layer: its rendered
/// content plus usage counts, when the client reported them.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Rendered response content; embedded verbatim in the record.
    pub content: String,
    /// Usage counts; absent when the client did not report them.
    pub usage: Option<Usage>,
}

/// Borrowed inputs of one `log_chat_completion` call.
#[derive(Debug, Clone)]
pub struct ChatCompletion<'a> {
    pub invocation_id: &'a str,
    pub client_id: u64,
    pub wrapper_id: u64,
    pub source: &'a Source,
    pub request: &'a Payload,
    pub response: &'a CompletionResponse,
    pub is_cached: bool,
    pub cost: f64,
    /// Wire-format timestamp of when the model call began.
    pub start_time: &'a str,
}

/// The adapter: session identity + injected log and span sinks.
///
/// State machine: Started on construction, Stopped after [`stop`]. Operations
/// invoked after `stop` degrade silently through the guard.
///
/// [`stop`]: OtelLogger::stop
pub struct OtelLogger {
    session_id: SessionId,
    emitter: LogEmitter,
    spans: SpanRecorder,
    stopped: AtomicBool,
}

impl OtelLogger {
    /// Construct an adapter over injected sinks. Generates the session id;
    /// the instance is in the Started state when this returns.
    pub fn new(log_sink: Arc<dyn LogSink>, span_sink: Arc<dyn SpanSink>) -> Self {
        Self {
            session_id: SessionId::generate(),
            emitter: LogEmitter::new(log_sink),
            spans: SpanRecorder::new(span_sink),
            stopped: AtomicBool::new(false),
        }
    }

    /// The session id embedded in every record this instance emits.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Announce the session and return its id.
    ///
    /// The id was generated at construction; only the announcement is
    /// guarded, so the id is returned even when the announcement fails.
    pub fn start(&self) -> SessionId {
        guard(&self.emitter, "announce session start", || {
            self.ensure_started()?;
            self.emitter.emit(&SessionStartRecord {
                event_name: "session_start".into(),
                session_id: self.session_id.as_str().to_owned(),
                timestamp: current_timestamp(),
                thread_id: current_thread_id(),
            })
        });
        self.session_id.clone()
    }

    /// Stop the logger and release owned sink handles. Idempotent; never
    /// fails visibly.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.emitter.close();
        }
    }

    /// Deliberate no-op, kept for interface parity with sibling logger
    /// implementations that hand out a connection handle.
    pub fn get_connection(&self) {}

    /// Log a new agent instance.
    ///
    /// `_init_args` is accepted for interface parity; the new-agent record
    /// schema does not include it.
    pub fn log_new_agent(&self, agent: &Source, _init_args: &Payload) {
        guard(&self.emitter, "log new agent", || {
            self.ensure_started()?;
            self.emitter.emit(&NewAgentRecord {
                id: agent.source_id(),
                agent_name: agent.display_name().unwrap_or_default().to_owned(),
                wrapper_id: agent.wrapper_id(),
                session_id: self.session_id.as_str().to_owned(),
                current_time: current_timestamp(),
                agent_type: agent.class_label().unwrap_or(UNKNOWN_SOURCE).to_owned(),
                thread_id: current_thread_id(),
            })
        });
    }

    /// Log a new client wrapper. Credential keys ([`REDACTED_WRAPPER_KEYS`])
    /// are stripped from `init_args` before anything is rendered.
    pub fn log_new_wrapper(&self, wrapper: &Source, init_args: &Payload) {
        guard(&self.emitter, "log new wrapper", || {
            self.ensure_started()?;
            let args = redact(init_args, REDACTED_WRAPPER_KEYS);
            self.emitter.emit(&NewWrapperRecord {
                wrapper_id: wrapper.source_id(),
                session_id: self.session_id.as_str().to_owned(),
                json_state: safe_serialize(&args),
                timestamp: current_timestamp(),
                thread_id: current_thread_id(),
            })
        });
    }

    /// Log a new model client created under `wrapper`.
    pub fn log_new_client(&self, client: &Source, wrapper: &Source, init_args: &Payload) {
        guard(&self.emitter, "log new client", || {
            self.ensure_started()?;
            self.emitter.emit(&NewClientRecord {
                client_id: client.source_id(),
                wrapper_id: wrapper.source_id(),
                session_id: self.session_id.as_str().to_owned(),
                class_label: client.class_label().unwrap_or(UNKNOWN_SOURCE).to_owned(),
                json_state: safe_serialize(init_args),
                timestamp: current_timestamp(),
                thread_id: current_thread_id(),
            })
        });
    }

    /// Log a model invocation: one record plus an `llm_span` covering the
    /// actual call window (start parsed from `call.start_time`, end = now).
    ///
    /// Token counts and cost are set as first-class span attributes so the
    /// backend can aggregate on them without deserialising the record blob.
    pub fn log_chat_completion(&self, call: &ChatCompletion<'_>) {
        guard(&self.emitter, "log chat completion", || {
            self.ensure_started()?;
            let usage = call
                .response
                .usage
                .ok_or(TelemetryError::MissingField("response.usage"))?;
            let source_name = call.source.resolved_name().to_owned();
            let end_time = current_timestamp();

            let record = ChatCompletionRecord {
                invocation_id: call.invocation_id.to_owned(),
                client_id: call.client_id,
                wrapper_id: call.wrapper_id,
                request: call.request.to_json_value(),
                response: call.response.content.clone(),
                is_cached: call.is_cached as i64,
                cost: call.cost,
                start_time: call.start_time.to_owned(),
                end_time: end_time.clone(),
                thread_id: current_thread_id(),
                source_name: source_name.clone(),
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            };
            let body = self.emitter.render(&record)?;

            self.spans.record_span(
                "llm_span",
                Some(call.start_time),
                Some(&end_time),
                vec![
                    ("data".into(), AttrValue::Str(body.clone())),
                    ("cost".into(), AttrValue::Float(call.cost)),
                    ("source_name".into(), AttrValue::Str(source_name)),
                    ("prompt_tokens".into(), AttrValue::Int(usage.prompt_tokens)),
                    (
                        "completion_tokens".into(),
                        AttrValue::Int(usage.completion_tokens),
                    ),
                    ("total_tokens".into(), AttrValue::Int(usage.total_tokens)),
                ],
            )?;

            self.emitter.submit(&body);
            Ok(())
        });
    }

    /// Log a registered function (tool) invocation.
    ///
    /// `_function` is accepted for interface parity; the function-use record
    /// schema carries only the source identity plus arguments and returns.
    pub fn log_function_use(
        &self,
        source: &Source,
        _function: &str,
        args: &Payload,
        returns: &Payload,
    ) {
        guard(&self.emitter, "log function use", || {
            self.ensure_started()?;
            let record = FunctionUseRecord {
                source_id: source.source_id(),
                source_name: source.resolved_name().to_owned(),
                agent_module: source.module_label().map(str::to_owned),
                agent_class: source.class_label().map(str::to_owned),
                timestamp: current_timestamp(),
                thread_id: current_thread_id(),
                input_args: safe_serialize(args),
                returns: safe_serialize(returns),
            };
            let body = self.emitter.render(&record)?;

            self.spans.record_span(
                "function_span",
                None,
                None,
                vec![
                    (
                        "source_name".into(),
                        AttrValue::Str(source.resolved_name().to_owned()),
                    ),
                    ("data".into(), AttrValue::Str(body.clone())),
                ],
            )?;

            self.emitter.submit(&body);
            Ok(())
        });
    }

    /// Log a generic named event.
    ///
    /// `kwargs` is safe-serialised into the record's `json_state`. Agent-like
    /// sources additionally get module/class fields and a
    /// `"{source}:{event}"` span whose start instant may be supplied through
    /// a `start_time` kwarg.
    pub fn log_event(&self, source: &Source, name: &str, kwargs: &Payload) {
        guard(&self.emitter, "log event", || {
            self.ensure_started()?;
            let json_state = safe_serialize(kwargs);

            if source.is_agent_like() {
                let source_name = source.resolved_name().to_owned();
                let record = EventRecord {
                    source_id: source.source_id(),
                    source_name: source_name.clone(),
                    event_name: name.to_owned(),
                    agent_module: source.module_label().map(str::to_owned),
                    agent_class: source.class_label().map(str::to_owned),
                    json_state,
                    timestamp: current_timestamp(),
                    thread_id: current_thread_id(),
                };
                let body = self.emitter.render(&record)?;

                self.spans.record_span(
                    format!("{source_name}:{name}"),
                    kwargs.get_str("start_time"),
                    None,
                    vec![
                        ("source_name".into(), AttrValue::Str(source_name)),
                        ("event_name".into(), AttrValue::Str(name.to_owned())),
                        ("data".into(), AttrValue::Str(body.clone())),
                    ],
                )?;

                self.emitter.submit(&body);
            } else {
                self.emitter.emit(&EventRecord {
                    source_id: source.source_id(),
                    source_name: source.resolved_name().to_owned(),
                    event_name: name.to_owned(),
                    agent_module: None,
                    agent_class: None,
                    json_state,
                    timestamp: current_timestamp(),
                    thread_id: current_thread_id(),
                })?;
            }
            Ok(())
        });
    }

    fn ensure_started(&self) -> Result<(), TelemetryError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(TelemetryError::Stopped);
        }
        Ok(())
    }
}
