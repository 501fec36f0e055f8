//! End-to-end adapter behaviour against recording sink doubles: record and
//! span correlation for model calls, explicit span windows, credential
//! redaction, fault containment, and concurrent emission.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use agent_otel::{
    ChatCompletion, CompletionResponse, LogSink, NamedSource, OtelLogger, Payload, Source,
    SpanRecord, SpanSink, Usage,
};

#[derive(Default)]
struct RecordingLogSink {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl LogSink for RecordingLogSink {
    fn info(&self, body: &str) {
        self.infos.lock().unwrap().push(body.to_owned());
    }

    fn error(&self, body: &str) {
        self.errors.lock().unwrap().push(body.to_owned());
    }
}

#[derive(Default)]
struct RecordingSpanSink {
    spans: Mutex<Vec<SpanRecord>>,
}

impl SpanSink for RecordingSpanSink {
    fn record(&self, span: SpanRecord) {
        self.spans.lock().unwrap().push(span);
    }
}

fn logger() -> (OtelLogger, Arc<RecordingLogSink>, Arc<RecordingSpanSink>) {
    let logs = Arc::new(RecordingLogSink::default());
    let spans = Arc::new(RecordingSpanSink::default());
    (OtelLogger::new(logs.clone(), spans.clone()), logs, spans)
}

fn attr<'a>(span: &'a SpanRecord, key: &str) -> Option<&'a agent_otel::AttrValue> {
    span.attributes
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

#[test]
fn chat_completion_propagates_usage_to_record_and_span() {
    let (logger, logs, spans) = logger();
    logger.start();

    let request = Payload::map([
        ("model", Payload::from("gpt-4")),
        (
            "messages",
            Payload::Seq(vec![Payload::map([
                ("role", Payload::from("user")),
                ("content", Payload::from("plan the trip")),
            ])]),
        ),
    ]);
    let response = CompletionResponse {
        content: "itinerary drafted".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    };
    logger.log_chat_completion(&ChatCompletion {
        invocation_id: "4fa2b9c1",
        client_id: 101,
        wrapper_id: 202,
        source: &Source::raw("planner"),
        request: &request,
        response: &response,
        is_cached: false,
        cost: 0.002,
        start_time: "2024-01-01 00:00:00.000000",
    });

    // Record: token counts and cost verbatim, request preserved as an object.
    let infos = logs.infos.lock().unwrap();
    let record: serde_json::Value = serde_json::from_str(infos.last().unwrap()).unwrap();
    assert_eq!(record["prompt_tokens"], 10);
    assert_eq!(record["completion_tokens"], 5);
    assert_eq!(record["total_tokens"], 15);
    assert_eq!(record["cost"], 0.002);
    assert_eq!(record["is_cached"], 0);
    assert_eq!(record["source_name"], "planner");
    assert_eq!(record["request"]["model"], "gpt-4");
    assert_eq!(record["start_time"], "2024-01-01 00:00:00.000000");

    // Span: same numeric attributes, first-class.
    let spans = spans.spans.lock().unwrap();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, "llm_span");
    assert_eq!(attr(span, "prompt_tokens"), Some(&agent_otel::AttrValue::Int(10)));
    assert_eq!(
        attr(span, "completion_tokens"),
        Some(&agent_otel::AttrValue::Int(5))
    );
    assert_eq!(attr(span, "total_tokens"), Some(&agent_otel::AttrValue::Int(15)));
    assert_eq!(attr(span, "cost"), Some(&agent_otel::AttrValue::Float(0.002)));
    assert!(attr(span, "data").is_some());
}

#[test]
fn chat_completion_span_window_matches_supplied_start() {
    let (logger, _logs, spans) = logger();
    logger.start();

    let request = Payload::map::<&str, _>([]);
    let response = CompletionResponse {
        content: "ok".into(),
        usage: Some(Usage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
        }),
    };
    logger.log_chat_completion(&ChatCompletion {
        invocation_id: "inv",
        client_id: 1,
        wrapper_id: 2,
        source: &Source::raw("planner"),
        request: &request,
        response: &response,
        is_cached: true,
        cost: 0.0,
        start_time: "2024-01-01 00:00:00.000000",
    });

    let spans = spans.spans.lock().unwrap();
    let span = &spans[0];
    // Start is the parsed 2024 instant, not the recording-time clock.
    let expected_start = UNIX_EPOCH + Duration::from_secs(1_704_067_200);
    assert_eq!(span.start, expected_start);
    // The call completed "later" — duration is positive and matches the
    // parsed delta against now.
    assert!(span.end > span.start);
    assert!(span.end <= SystemTime::now());
}

#[test]
fn wrapper_credentials_never_reach_the_record() {
    let (logger, logs, _spans) = logger();
    logger.start();

    let init_args = Payload::map([
        ("api_key", Payload::from("sk-live-abcdef")),
        ("organization", Payload::from("org-42")),
        ("base_url", Payload::from("https://api.example")),
        ("azure_endpoint", Payload::from("https://azure.example")),
        ("azure_ad_token", Payload::from("aad-xyz")),
        ("model", Payload::from("gpt-4")),
        ("temperature", Payload::from(0.2)),
    ]);
    logger.log_new_wrapper(&Source::raw("wrapper"), &init_args);

    let infos = logs.infos.lock().unwrap();
    let body = infos.last().unwrap();
    for secret in ["sk-live-abcdef", "org-42", "api.example", "azure.example", "aad-xyz"] {
        assert!(!body.contains(secret), "leaked {secret} in {body}");
    }
    let record: serde_json::Value = serde_json::from_str(body).unwrap();
    let state = record["json_state"].as_str().unwrap();
    assert!(state.contains("gpt-4"));
    assert!(state.contains("0.2"));
}

#[test]
fn malformed_inputs_never_raise_and_always_leave_a_diagnostic() {
    let (logger, logs, _spans) = logger();
    logger.start();

    // Response lacking usage counts.
    let request = Payload::map::<&str, _>([]);
    let response = CompletionResponse {
        content: "ok".into(),
        usage: None,
    };
    logger.log_chat_completion(&ChatCompletion {
        invocation_id: "inv",
        client_id: 1,
        wrapper_id: 2,
        source: &Source::raw("planner"),
        request: &request,
        response: &response,
        is_cached: false,
        cost: 0.0,
        start_time: "2024-01-01 00:00:00.000000",
    });

    // Malformed start timestamp.
    let response = CompletionResponse {
        content: "ok".into(),
        usage: Some(Usage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
        }),
    };
    logger.log_chat_completion(&ChatCompletion {
        invocation_id: "inv",
        client_id: 1,
        wrapper_id: 2,
        source: &Source::raw("planner"),
        request: &request,
        response: &response,
        is_cached: false,
        cost: 0.0,
        start_time: "garbage",
    });

    let errors = logs.errors.lock().unwrap();
    assert_eq!(errors.len(), 2);
    for e in errors.iter() {
        assert!(e.contains("log chat completion"));
    }
}

#[test]
fn non_serializable_event_payloads_still_produce_valid_records() {
    struct RawSocket;
    impl agent_otel::OpaqueValue for RawSocket {
        fn type_name(&self) -> &str {
            "RawSocket"
        }
    }

    let (logger, logs, _spans) = logger();
    logger.start();
    logger.log_event(
        &Source::raw("user_proxy"),
        "connection_opened",
        &Payload::map([("socket", Payload::opaque(RawSocket))]),
    );

    let infos = logs.infos.lock().unwrap();
    let record: serde_json::Value = serde_json::from_str(infos.last().unwrap()).unwrap();
    let state = record["json_state"].as_str().unwrap();
    let inner: serde_json::Value = serde_json::from_str(state).unwrap();
    let leaf = inner["socket"].as_str().unwrap();
    assert!(leaf.contains("<<non-serializable"));
    assert!(leaf.contains("RawSocket"));
}

#[test]
fn concurrent_events_produce_independent_correctly_tagged_records() {
    const THREADS: usize = 8;

    let (logger, logs, _spans) = logger();
    logger.start();
    let announced = logs.infos.lock().unwrap().len();
    let logger = Arc::new(logger);

    std::thread::scope(|scope| {
        for i in 0..THREADS {
            let logger = Arc::clone(&logger);
            scope.spawn(move || {
                let source: Source = NamedSource::new(i as u64, format!("agent-{i}"))
                    .with_labels("agentchat", "AssistantAgent")
                    .into();
                logger.log_event(
                    &source,
                    "heartbeat",
                    &Payload::map([("worker", Payload::Int(i as i64))]),
                );
            });
        }
    });

    let infos = logs.infos.lock().unwrap();
    assert!(logs.errors.lock().unwrap().is_empty());
    assert_eq!(infos.len(), announced + THREADS);

    let mut thread_ids = HashSet::new();
    let mut workers = HashSet::new();
    for body in infos.iter().skip(announced) {
        let record: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(record["event_name"], "heartbeat");

        // No cross-contamination: the worker index in json_state matches the
        // source that logged it.
        let state: serde_json::Value =
            serde_json::from_str(record["json_state"].as_str().unwrap()).unwrap();
        let worker = state["worker"].as_i64().unwrap();
        assert_eq!(record["source_name"], format!("agent-{worker}"));
        assert_eq!(record["source_id"], worker);

        workers.insert(worker);
        thread_ids.insert(record["thread_id"].as_str().unwrap().to_owned());
    }
    assert_eq!(workers.len(), THREADS);
    assert_eq!(thread_ids.len(), THREADS);
}

#[test]
fn one_session_id_spans_the_whole_lifetime() {
    let (logger, logs, _spans) = logger();
    let id = logger.start();

    logger.log_new_agent(
        &Source::from(NamedSource::new(1, "planner").with_wrapper(7)),
        &Payload::map::<&str, _>([]),
    );
    logger.log_new_wrapper(&Source::raw("wrapper"), &Payload::map::<&str, _>([]));
    logger.log_new_client(
        &Source::from(NamedSource {
            id: 3,
            class: Some("OpenAIClient".into()),
            ..NamedSource::default()
        }),
        &Source::raw("wrapper"),
        &Payload::map::<&str, _>([]),
    );

    {
        let infos = logs.infos.lock().unwrap();
        assert_eq!(infos.len(), 4);
        for body in infos.iter() {
            let record: serde_json::Value = serde_json::from_str(body).unwrap();
            assert_eq!(record["session_id"], id.as_str());
        }
    }

    logger.stop();
    logger.log_new_wrapper(&Source::raw("late"), &Payload::map::<&str, _>([]));
    // Nothing new after stop; the failed call left a diagnostic instead.
    assert_eq!(logs.infos.lock().unwrap().len(), 4);
    assert_eq!(logs.errors.lock().unwrap().len(), 1);
}
