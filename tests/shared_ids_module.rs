use stepweave::catalog::StateKey;
use stepweave::shared::ids::{generate_compact_id, ExecutionId, RunId, TemplateId};

#[test]
fn id_types_validate_their_charset() {
    assert!(TemplateId::parse("context-setup").is_ok());
    assert!(TemplateId::parse("with spaces").is_err());
    assert!(TemplateId::parse("").is_err());
    assert!(RunId::parse("run-abc_123").is_ok());
}

#[test]
fn state_keys_follow_the_placeholder_identifier_rules() {
    assert!(StateKey::parse("companyName").is_ok());
    assert!(StateKey::parse("_welcome").is_ok());
    assert!(StateKey::parse("a1_b2").is_ok());
    // Dashes are legal in ids but not inside placeholders.
    assert!(StateKey::parse("not-a-key").is_err());
    assert!(StateKey::parse("1leading").is_err());
    assert!(StateKey::parse("").is_err());

    assert!(StateKey::parse("_hidden").expect("key").is_presentational());
    assert!(!StateKey::parse("shown").expect("key").is_presentational());
}

#[test]
fn compact_ids_embed_prefix_and_timestamp() {
    let id = generate_compact_id("run", 1_700_000_000).expect("id");
    assert!(id.starts_with("run-"));
    let parts: Vec<_> = id.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[2].len(), 4);

    assert!(generate_compact_id("run", -5).is_err());

    let run_id = RunId::generate(1_700_000_000).expect("run id");
    assert!(run_id.as_str().starts_with("run-"));
    let execution_id = ExecutionId::generate(1_700_000_000).expect("execution id");
    assert!(execution_id.as_str().starts_with("exec-"));
}
