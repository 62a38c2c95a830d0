use scout::host::contract::{
    CommandEnvelope, CommandName, EVENT_VERSION, EnvelopeError, EventEnvelope, HostEvent,
    ResponseEnvelope,
};

const ALL_COMMANDS: &[(CommandName, &str)] = &[
    (CommandName::HostPing, "host.ping"),
    (CommandName::HostVersion, "host.version"),
    (CommandName::ToolsList, "tools.list"),
    (CommandName::SearchWeb, "search.web"),
    (CommandName::SearchEngineStatus, "search.engine_status"),
    (CommandName::SearchResetEngines, "search.reset_engines"),
    (CommandName::PageContent, "page.content"),
    (CommandName::RuntimeStop, "runtime.stop"),
];

#[test]
fn command_names_match_wire_format() {
    for (name, wire) in ALL_COMMANDS {
        assert_eq!(name.as_str(), *wire);
        assert_eq!(CommandName::parse(wire), Some(*name));

        let json = serde_json::to_value(name).expect("serialize command name");
        assert_eq!(json, *wire);
        let back: CommandName = serde_json::from_value(json).expect("deserialize command name");
        assert_eq!(back, *name);
    }
    assert!(CommandName::parse("search.not_real").is_none());
}

#[test]
fn command_envelope_json_shape() {
    let envelope = CommandEnvelope::new(
        "req-123",
        CommandName::SearchWeb,
        serde_json::json!({"query": "rust", "max_results": 5}),
    );

    let json = serde_json::to_value(&envelope).expect("serialize command envelope");
    assert_eq!(json["v"], EVENT_VERSION);
    assert_eq!(json["request_id"], "req-123");
    assert_eq!(json["command"], "search.web");
    assert_eq!(json["payload"]["max_results"], 5);
}

#[test]
fn command_envelope_payload_may_be_omitted() {
    let envelope: CommandEnvelope =
        serde_json::from_str(r#"{"v":1,"request_id":"r","command":"search.engine_status"}"#)
            .expect("parse");
    assert!(envelope.payload.is_null());
    assert!(envelope.validate().is_ok());
}

#[test]
fn command_envelope_rejects_wrong_version_and_blank_id() {
    let mut envelope =
        CommandEnvelope::new("req-1", CommandName::HostPing, serde_json::json!({}));
    envelope.v = EVENT_VERSION + 1;
    let err = envelope.validate().expect_err("version should be rejected");
    assert_eq!(err, EnvelopeError::UnsupportedVersion { found: EVENT_VERSION + 1 });

    let envelope = CommandEnvelope::new("  ", CommandName::HostPing, serde_json::json!({}));
    let err = envelope.validate().expect_err("blank id should be rejected");
    assert_eq!(err, EnvelopeError::MissingRequestId);
}

#[test]
fn response_envelope_json_shape() {
    let ok = ResponseEnvelope::ok("req-1", serde_json::json!({"engine": "google"}));
    let ok_json = serde_json::to_value(&ok).expect("serialize ok response");
    assert_eq!(ok_json["ok"], true);
    assert_eq!(ok_json["payload"]["engine"], "google");
    assert!(ok_json["error"].is_null());

    let err = ResponseEnvelope::error("req-2", "query must not be empty");
    let err_json = serde_json::to_value(&err).expect("serialize error response");
    assert_eq!(err_json["v"], EVENT_VERSION);
    assert_eq!(err_json["ok"], false);
    assert_eq!(err_json["payload"], serde_json::Value::Null);
    assert_eq!(err_json["error"], "query must not be empty");
}

#[test]
fn event_envelope_json_shape() {
    let event = EventEnvelope::new(
        "evt-1",
        HostEvent::SearchCompleted,
        serde_json::json!({"engine": "bing", "count": 3}),
    );
    let json = serde_json::to_value(&event).expect("serialize event");
    assert_eq!(json["event_id"], "evt-1");
    assert_eq!(json["event"], "search.completed");
    assert_eq!(json["payload"]["count"], 3);
}
