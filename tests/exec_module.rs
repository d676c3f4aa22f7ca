use serde_json::json;
use std::sync::mpsc;
use stepweave::binder::{Value, ValueBag};
use stepweave::catalog::{load_catalog_yaml_str, StateKey};
use stepweave::exec::{
    drive_execution, normalize_output, prepare_execution, ExecutionEvent, ExecutionRecord,
    ExecutionStatus, OutputTag, RawOutputPayload,
};
use stepweave::run::EngineError;
use stepweave::shared::ids::{ExecutionId, TemplateId};
use stepweave::shared::logging::{engine_log_path, EngineLog};
use tempfile::tempdir;

const AUTOMATION_YAML: &str = r#"
templates:
  - id: prospector
    name: Prospector
    body: |-
      const companies = {{companies}};
      const maxResults = {{maxResults}};
      const headless = {{headless}};
      run(companies, maxResults, headless);
"#;

fn record(now: i64) -> ExecutionRecord {
    ExecutionRecord::new(
        ExecutionId::parse("exec-1").expect("execution id"),
        TemplateId::parse("prospector").expect("template id"),
        ValueBag::new(),
        now,
    )
}

fn raw_payload(tag: &str, columns: Option<Vec<String>>) -> RawOutputPayload {
    RawOutputPayload {
        output_type: tag.to_string(),
        title: "result".to_string(),
        data: json!([{"name": "Acme"}]),
        columns,
    }
}

#[test]
fn prepare_execution_produces_a_declarable_script_fragment() {
    let catalog = load_catalog_yaml_str(AUTOMATION_YAML).expect("load catalog");
    let template = catalog.template("prospector").expect("template");

    let mut variables = ValueBag::new();
    variables.insert(
        StateKey::parse("companies").expect("key"),
        Value::from_json(json!([{"name": "Acme, Inc."}, {"name": "Globex"}])),
    );
    variables.insert(StateKey::parse("maxResults").expect("key"), Value::number(25));
    variables.insert(StateKey::parse("headless").expect("key"), Value::bool(true));

    let bound = prepare_execution(template, &variables).expect("prepare");
    assert!(bound
        .text
        .contains(r#"const companies = [{"name":"Acme, Inc."},{"name":"Globex"}];"#));
    assert!(bound.text.contains("const maxResults = 25;"));
    assert!(bound.text.contains("const headless = true;"));
    assert!(bound.warnings.is_empty());
}

#[test]
fn prepare_execution_requires_a_template_body() {
    let raw = r#"
templates:
  - id: guided
    name: Guided
    steps:
      - id: only
        title: Only
        components:
          - kind: text_input
            state_key: name
"#;
    let catalog = load_catalog_yaml_str(raw).expect("load catalog");
    let template = catalog.template("guided").expect("template");
    assert!(matches!(
        prepare_execution(template, &ValueBag::new()),
        Err(EngineError::MissingBody { .. })
    ));
}

#[test]
fn logs_are_recorded_in_exact_arrival_order() {
    let mut record = record(100);
    let (sender, receiver) = mpsc::channel();

    let expected: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
    for line in &expected {
        sender.send(ExecutionEvent::Log(line.clone())).expect("send");
    }
    sender
        .send(ExecutionEvent::Completed(raw_payload("markdown", None)))
        .expect("send");
    drop(sender);

    let report = drive_execution(&mut record, receiver, None, 101);
    assert_eq!(record.logs, expected);
    assert_eq!(record.status, ExecutionStatus::Completed);
    assert_eq!(report.late_events, 0);
    assert!(report.downgrades.is_empty());
}

#[test]
fn events_after_the_terminal_payload_are_ignored() {
    let mut record = record(100);
    let (sender, receiver) = mpsc::channel();

    sender
        .send(ExecutionEvent::Log("before".to_string()))
        .expect("send");
    sender
        .send(ExecutionEvent::Completed(raw_payload("json", None)))
        .expect("send");
    sender
        .send(ExecutionEvent::Log("late".to_string()))
        .expect("send");
    sender
        .send(ExecutionEvent::Failed("late failure".to_string()))
        .expect("send");
    drop(sender);

    let report = drive_execution(&mut record, receiver, None, 101);
    assert_eq!(record.logs, vec!["before".to_string()]);
    assert_eq!(record.status, ExecutionStatus::Completed);
    assert!(record.error.is_none());
    assert_eq!(report.late_events, 2);
}

#[test]
fn failure_preserves_logs_collected_so_far() {
    let mut record = record(100);
    let (sender, receiver) = mpsc::channel();

    sender
        .send(ExecutionEvent::Log("navigated".to_string()))
        .expect("send");
    sender
        .send(ExecutionEvent::Failed("page crashed".to_string()))
        .expect("send");
    drop(sender);

    drive_execution(&mut record, receiver, None, 101);
    assert_eq!(record.status, ExecutionStatus::Failed);
    assert_eq!(record.error.as_deref(), Some("page crashed"));
    assert_eq!(record.logs, vec!["navigated".to_string()]);
    assert!(record.output.is_none());
}

#[test]
fn a_stream_that_dies_without_a_terminal_event_fails_the_record() {
    let mut record = record(100);
    let (sender, receiver) = mpsc::channel();
    sender
        .send(ExecutionEvent::Log("started".to_string()))
        .expect("send");
    drop(sender);

    drive_execution(&mut record, receiver, None, 101);
    assert_eq!(record.status, ExecutionStatus::Failed);
    assert!(record
        .error
        .as_deref()
        .expect("error")
        .contains("without a terminal event"));
    assert_eq!(record.logs, vec!["started".to_string()]);
}

#[test]
fn unknown_output_tags_downgrade_to_json_with_a_logged_warning() {
    let dir = tempdir().expect("tempdir");
    let engine_log = EngineLog::new(dir.path());

    let mut record = record(100);
    let (sender, receiver) = mpsc::channel();
    sender
        .send(ExecutionEvent::Completed(raw_payload("spreadsheet", None)))
        .expect("send");
    drop(sender);

    let report = drive_execution(&mut record, receiver, Some(&engine_log), 101);
    assert_eq!(record.status, ExecutionStatus::Completed);
    let output = record.output.as_ref().expect("output");
    assert_eq!(output.output_type, OutputTag::Json);
    assert_eq!(report.downgrades.len(), 1);
    assert!(report.downgrades[0].contains("spreadsheet"));

    let logged = std::fs::read_to_string(engine_log_path(dir.path())).expect("log file");
    assert!(logged.contains("output_downgrade"));
    assert!(logged.contains("spreadsheet"));
}

#[test]
fn table_without_columns_downgrades_to_json() {
    let normalized = normalize_output(raw_payload("table", None));
    assert_eq!(normalized.payload.output_type, OutputTag::Json);
    assert!(normalized.downgrade.is_some());

    let with_columns = normalize_output(raw_payload(
        "table",
        Some(vec!["name".to_string(), "website".to_string()]),
    ));
    assert_eq!(with_columns.payload.output_type, OutputTag::Table);
    assert!(with_columns.downgrade.is_none());
}

#[test]
fn known_tags_pass_through_unchanged() {
    for tag in ["markdown", "json", "csv"] {
        let normalized = normalize_output(raw_payload(tag, None));
        assert_eq!(normalized.payload.output_type.as_str(), tag);
        assert!(normalized.downgrade.is_none());
    }
}

#[test]
fn terminal_record_rejects_every_mutation_without_corruption() {
    let mut record = record(100);
    assert!(record.mark_running(101));
    assert!(record.append_log("one", 102));
    assert!(record.complete(
        normalize_output(raw_payload("json", None)).payload,
        103
    ));

    assert!(!record.append_log("late", 104));
    assert!(!record.fail("late", 105));
    assert!(!record.mark_running(106));
    assert_eq!(record.logs, vec!["one".to_string()]);
    assert_eq!(record.status, ExecutionStatus::Completed);
    assert!(record.error.is_none());
}

#[test]
fn record_serializes_with_the_wire_field_names() {
    let record = record(100);
    let raw = serde_json::to_value(&record).expect("serialize");
    assert!(raw.get("executionId").is_some());
    assert!(raw.get("workflowId").is_some());
    assert_eq!(raw.get("status"), Some(&json!("pending")));
}
