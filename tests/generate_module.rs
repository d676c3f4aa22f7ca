use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;
use stepweave::binder::{RenderContext, Value, ValueBag};
use stepweave::catalog::{load_catalog_yaml_str, GenerationFormat, StateKey};
use stepweave::generate::{
    extract_first_json_span, generate, run_auto_generations, ChatMessage, ChatOptions,
    GenerationClient, GenerationError, GenerationOutcome,
};
use stepweave::run::StepMachine;
use stepweave::shared::ids::RunId;

/// Replays scripted responses and records the prompts it saw.
struct ScriptedClient {
    responses: RefCell<VecDeque<Result<String, String>>>,
    prompts: RefCell<Vec<String>>,
    system_prompts: RefCell<Vec<Option<String>>>,
}

impl ScriptedClient {
    fn new(responses: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().collect()),
            prompts: RefCell::new(Vec::new()),
            system_prompts: RefCell::new(Vec::new()),
        }
    }

    fn replying(text: &str) -> Self {
        Self::new([Ok(text.to_string())])
    }
}

impl GenerationClient for ScriptedClient {
    fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, GenerationError> {
        let user_prompt = messages
            .iter()
            .rev()
            .find(|message| matches!(message.role, stepweave::generate::ChatRole::User))
            .map(|message| message.content.clone())
            .unwrap_or_default();
        self.prompts.borrow_mut().push(user_prompt);
        self.system_prompts
            .borrow_mut()
            .push(options.system_prompt.clone());
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(GenerationError::Transport(reason)),
            None => Err(GenerationError::EmptyResponse),
        }
    }
}

fn options() -> ChatOptions {
    ChatOptions::for_model("test-model")
}

#[test]
fn json_span_extraction_tolerates_prose_and_fences() {
    let response = "Sure! ```json\n{\"a\":1}\n```";
    assert_eq!(extract_first_json_span(response), Some("{\"a\":1}"));

    let array = "here you go [1, 2, {\"k\": \"}\"}] trailing";
    assert_eq!(extract_first_json_span(array), Some("[1, 2, {\"k\": \"}\"}]"));

    assert_eq!(extract_first_json_span("no json here"), None);
    assert_eq!(extract_first_json_span("broken { \"a\": "), None);
}

#[test]
fn json_format_parses_the_first_balanced_span() {
    let client = ScriptedClient::replying("Sure! ```json\n{\"a\":1}\n```");
    let result = generate(
        &client,
        "give me json",
        &ValueBag::new(),
        &RenderContext::default(),
        GenerationFormat::Json,
        &options(),
    )
    .expect("generate");
    assert_eq!(result.outcome, GenerationOutcome::Json(json!({"a": 1})));
    assert!(!result.outcome.is_degraded());
}

#[test]
fn unparseable_json_degrades_to_raw_fallback() {
    let client = ScriptedClient::replying("I could not produce JSON, sorry.");
    let result = generate(
        &client,
        "give me json",
        &ValueBag::new(),
        &RenderContext::default(),
        GenerationFormat::Json,
        &options(),
    )
    .expect("generate");
    match &result.outcome {
        GenerationOutcome::RawFallback { raw } => {
            assert_eq!(raw, "I could not produce JSON, sorry.");
        }
        other => panic!("expected raw fallback, got {other:?}"),
    }
    // The serialized shape stays the `{"raw": ...}` wrapper.
    assert_eq!(
        result.outcome.to_json(),
        json!({"raw": "I could not produce JSON, sorry."})
    );
}

#[test]
fn markdown_format_returns_provider_text_verbatim() {
    let client = ScriptedClient::replying("# Title\n\nBody with {braces} intact.");
    let result = generate(
        &client,
        "write markdown",
        &ValueBag::new(),
        &RenderContext::default(),
        GenerationFormat::Markdown,
        &options(),
    )
    .expect("generate");
    assert_eq!(
        result.outcome,
        GenerationOutcome::Text("# Title\n\nBody with {braces} intact.".to_string())
    );
}

#[test]
fn prompt_binds_against_the_bag_before_the_call() {
    let mut bag = ValueBag::new();
    bag.insert(
        StateKey::parse("role").expect("key"),
        Value::text("founder"),
    );
    let client = ScriptedClient::replying("ok");
    generate(
        &client,
        "Role: {{role}}",
        &bag,
        &RenderContext::default(),
        GenerationFormat::Text,
        &options(),
    )
    .expect("generate");
    assert_eq!(client.prompts.borrow().as_slice(), ["Role: founder"]);
}

#[test]
fn system_prompt_is_forwarded_when_present() {
    let client = ScriptedClient::replying("ok");
    generate(
        &client,
        "hello",
        &ValueBag::new(),
        &RenderContext::default(),
        GenerationFormat::Text,
        &options().with_system_prompt("be terse"),
    )
    .expect("generate");
    assert_eq!(
        client.system_prompts.borrow().as_slice(),
        [Some("be terse".to_string())]
    );
}

#[test]
fn provider_failure_is_a_recoverable_error_not_an_empty_success() {
    let client = ScriptedClient::new([Err("connection reset".to_string())]);
    let err = generate(
        &client,
        "hello",
        &ValueBag::new(),
        &RenderContext::default(),
        GenerationFormat::Markdown,
        &options(),
    )
    .expect_err("transport failure must surface");
    assert!(matches!(err, GenerationError::Transport(_)));
}

#[test]
fn empty_provider_response_is_an_error() {
    let client = ScriptedClient::replying("   ");
    assert!(matches!(
        generate(
            &client,
            "hello",
            &ValueBag::new(),
            &RenderContext::default(),
            GenerationFormat::Markdown,
            &options(),
        ),
        Err(GenerationError::EmptyResponse)
    ));
}

const AI_STEPS_YAML: &str = r#"
templates:
  - id: enhanced
    name: Enhanced
    steps:
      - id: gather
        title: Gather
        components:
          - kind: text_input
            state_key: topic
            required: true
      - id: enrich
        title: Enrich
        skippable: true
        ai_enhanced: true
        components:
          - kind: ai_generate
            state_key: outline
            prompt: "Outline {{topic}}"
            auto_trigger: true
          - kind: ai_generate
            state_key: summary
            prompt: "Summarize this outline: {{outline}}"
            auto_trigger: true
"#;

#[test]
fn auto_generations_run_in_declaration_order_and_see_prior_outputs() {
    let catalog = load_catalog_yaml_str(AI_STEPS_YAML).expect("load catalog");
    let template = catalog.template("enhanced").expect("template");
    let run_id = RunId::parse("run-enhanced").expect("run id");
    let mut machine = StepMachine::start_with_run_id(template, run_id, 100).expect("start");

    machine
        .set_value("topic", Value::text("cold outreach"), 101)
        .expect("set value");
    machine.advance(102).expect("advance to enrich");

    // advance is blocked until the auto generations complete
    assert!(matches!(
        machine.advance(103),
        Err(stepweave::run::EngineError::GenerationPending { .. })
    ));
    assert_eq!(machine.pending_auto_generations().len(), 2);

    let client = ScriptedClient::new([
        Ok("OUTLINE-TEXT".to_string()),
        Ok("SUMMARY-TEXT".to_string()),
    ]);
    let written = run_auto_generations(
        &mut machine,
        &client,
        &RenderContext::default(),
        &options(),
        104,
    )
    .expect("auto generations");
    assert_eq!(written, vec!["outline".to_string(), "summary".to_string()]);

    // The second prompt saw the first component's output already merged.
    assert_eq!(
        client.prompts.borrow().as_slice(),
        [
            "Outline cold outreach",
            "Summarize this outline: OUTLINE-TEXT"
        ]
    );

    assert!(machine.pending_auto_generations().is_empty());
    machine.advance(105).expect("advance after generation");
}

#[test]
fn failed_auto_generation_keeps_the_step_in_place_for_retry() {
    let catalog = load_catalog_yaml_str(AI_STEPS_YAML).expect("load catalog");
    let template = catalog.template("enhanced").expect("template");
    let run_id = RunId::parse("run-retry").expect("run id");
    let mut machine = StepMachine::start_with_run_id(template, run_id, 100).expect("start");

    machine
        .set_value("topic", Value::text("pricing"), 101)
        .expect("set value");
    machine.advance(102).expect("advance");

    let failing = ScriptedClient::new([Err("provider timeout".to_string())]);
    let err = run_auto_generations(
        &mut machine,
        &failing,
        &RenderContext::default(),
        &options(),
        103,
    )
    .expect_err("failure must surface");
    assert!(err.to_string().contains("provider timeout"));

    // Run state is untouched: still on the step, key unset, retry legal.
    assert_eq!(machine.current_step().expect("step").id.as_str(), "enrich");
    assert!(!machine.run().values.is_set("outline"));

    let retry = ScriptedClient::new([Ok("OUTLINE".to_string()), Ok("SUMMARY".to_string())]);
    run_auto_generations(
        &mut machine,
        &retry,
        &RenderContext::default(),
        &options(),
        104,
    )
    .expect("retry succeeds");
    assert!(machine.run().values.is_set("outline"));

    // The step was also skippable the whole time.
    let run_id = RunId::parse("run-skip").expect("run id");
    let mut skipping = StepMachine::start_with_run_id(template, run_id, 200).expect("start");
    skipping
        .set_value("topic", Value::text("pricing"), 201)
        .expect("set value");
    skipping.advance(202).expect("advance");
    skipping.skip(203).expect("skip the enhanced step");
}

#[test]
fn streamed_chunks_arrive_in_order_through_the_default_stream() {
    let client = ScriptedClient::replying("whole response");
    let receiver = client
        .chat_stream(&[ChatMessage::user("hi")], &options())
        .expect("stream");
    let chunks: Vec<_> = receiver.iter().collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].as_deref().expect("chunk"), "whole response");
}
