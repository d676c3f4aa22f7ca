use crate::catalog::{
    Catalog, Difficulty, FieldComponent, FieldEnvelope, GenerationFormat, OutputKind, OutputSpec,
    SelectOption, StateKey, StepDefinition, TemplateDefinition, TemplateMetadata,
};
use crate::shared::ids::{StepId, TemplateId};

fn state_key(raw: &str) -> StateKey {
    StateKey::parse(raw).expect("built-in state key is valid")
}

fn field(raw_key: &str, required: bool, label: &str) -> FieldEnvelope {
    FieldEnvelope::new(state_key(raw_key), required, label)
}

fn text_input(raw_key: &str, required: bool, label: &str, placeholder: &str) -> FieldComponent {
    FieldComponent::TextInput {
        field: field(raw_key, required, label),
        placeholder: Some(placeholder.to_string()),
    }
}

fn textarea(raw_key: &str, required: bool, label: &str) -> FieldComponent {
    FieldComponent::Textarea {
        field: field(raw_key, required, label),
        placeholder: None,
        rows: Some(4),
    }
}

fn dropdown(raw_key: &str, required: bool, label: &str, options: &[(&str, &str)]) -> FieldComponent {
    FieldComponent::Dropdown {
        field: field(raw_key, required, label),
        options: options
            .iter()
            .map(|(value, label)| SelectOption::new(*value, *label))
            .collect(),
    }
}

fn step(raw_id: &str, title: &str, components: Vec<FieldComponent>) -> StepDefinition {
    StepDefinition {
        id: StepId::parse(raw_id).expect("built-in step id is valid"),
        title: title.to_string(),
        skippable: false,
        ai_enhanced: false,
        components,
    }
}

fn template_id(raw: &str) -> TemplateId {
    TemplateId::parse(raw).expect("built-in template id is valid")
}

/// Static instructions prepended as the system prompt for guided-form
/// generations.
pub fn default_generation_system_prompt() -> String {
    r#"You are the research assistant inside a notebook product.
Execution requirements:
- Ground every statement in the provided context; never invent facts.
- Answer in the requested output format only, with no preamble.
- When asked for JSON, emit a single JSON object or array and nothing else.
- Keep markdown output skimmable: short sections, bold key findings."#
        .to_string()
}

fn context_setup_template() -> TemplateDefinition {
    let basics = step(
        "basics",
        "Tell us about your business",
        vec![
            FieldComponent::InfoCard {
                field: field("_welcome", false, ""),
                text: "A few quick questions so every answer in this notebook starts from your \
                       actual context."
                    .to_string(),
            },
            text_input(
                "companyName",
                true,
                "Company name",
                "e.g. Northwind Traders",
            ),
            dropdown(
                "role",
                true,
                "Your role",
                &[
                    ("founder", "Founder / CEO"),
                    ("operator", "Operations lead"),
                    ("marketer", "Marketing lead"),
                    ("consultant", "Consultant / agency"),
                ],
            ),
            textarea("goals", false, "What are you trying to accomplish?"),
        ],
    );

    let mut intelligence = step(
        "intelligence",
        "Build your intelligence profile",
        vec![FieldComponent::AiGenerate {
            field: field("intelligenceProfile", false, "Intelligence profile"),
            prompt: "Write an intelligence profile for {{companyName}}. The reader is the \
                     company's {{role}}. Stated goals: {{goals}}. Cover market position, likely \
                     competitors, and three concrete opportunities."
                .to_string(),
            output_format: GenerationFormat::Markdown,
            auto_trigger: true,
        }],
    );
    intelligence.skippable = true;
    intelligence.ai_enhanced = true;

    let review = step(
        "review",
        "Review and finish",
        vec![
            textarea("notes", false, "Anything to add or correct?"),
            FieldComponent::Celebration {
                field: field("_done", false, ""),
                text: "Your workspace now knows your business.".to_string(),
            },
        ],
    );

    TemplateDefinition {
        id: template_id("context-setup"),
        name: "Context Setup Wizard".to_string(),
        metadata: TemplateMetadata {
            category: "onboarding".to_string(),
            difficulty: Difficulty::Beginner,
            estimated_minutes: Some(5),
        },
        steps: vec![basics, intelligence, review],
        body: None,
        output: Some(OutputSpec {
            output_type: OutputKind::Profile,
            title: "{{companyName}} context profile".to_string(),
            template: "# {{companyName}}\n\nRole: {{role}}\n\nGoals: {{goals}}\n\n\
                       {{intelligenceProfile}}\n\nNotes: {{notes}}\n"
                .to_string(),
        }),
    }
}

fn client_discovery_template() -> TemplateDefinition {
    let client = step(
        "client",
        "Who is the client?",
        vec![
            text_input("clientName", true, "Client name", "e.g. Contoso Ltd"),
            FieldComponent::UrlInput {
                field: field("clientWebsite", false, "Website"),
                placeholder: Some("https://".to_string()),
            },
            FieldComponent::TagInput {
                field: field("focusAreas", false, "Focus areas"),
                suggestions: vec![
                    "brand".to_string(),
                    "paid media".to_string(),
                    "seo".to_string(),
                    "lifecycle".to_string(),
                ],
            },
            FieldComponent::DatePicker {
                field: field("kickoffDate", false, "Kickoff date"),
            },
        ],
    );

    let needs = step(
        "needs",
        "What do they need?",
        vec![
            FieldComponent::CheckboxList {
                field: field("services", true, "Services in scope"),
                options: vec![
                    SelectOption::new("strategy", "Strategy"),
                    SelectOption::new("creative", "Creative"),
                    SelectOption::new("media", "Media buying"),
                    SelectOption::new("analytics", "Analytics"),
                ],
                multi_select: true,
            },
            FieldComponent::Slider {
                field: field("budgetScore", false, "Budget confidence"),
                min: 1.0,
                max: 10.0,
                step: Some(1.0),
            },
            textarea("painPoints", false, "Known pain points"),
        ],
    );

    let mut brief = step(
        "brief",
        "Discovery brief",
        vec![FieldComponent::AiGenerate {
            field: field("discoveryBrief", false, "Discovery brief"),
            prompt: "Draft a discovery brief for {{clientName}} ({{clientWebsite}}). Focus \
                     areas: {{focusAreas}}. Services in scope: {{services}}. Budget confidence \
                     {{budgetScore}}/10. Pain points: {{painPoints}}. End with five pointed \
                     questions for the kickoff call."
                .to_string(),
            output_format: GenerationFormat::Markdown,
            auto_trigger: true,
        }],
    );
    brief.skippable = true;
    brief.ai_enhanced = true;

    TemplateDefinition {
        id: template_id("client-discovery"),
        name: "Client Discovery".to_string(),
        metadata: TemplateMetadata {
            category: "sales".to_string(),
            difficulty: Difficulty::Intermediate,
            estimated_minutes: Some(10),
        },
        steps: vec![client, needs, brief],
        body: None,
        output: Some(OutputSpec {
            output_type: OutputKind::Report,
            title: "{{clientName}} discovery brief".to_string(),
            template: "{{logo}}\n\n# Discovery: {{clientName}}\n\nPrepared for \
                       {{recipient_name}}\nKickoff: {{kickoffDate}}\n\n{{discoveryBrief}}\n"
                .to_string(),
        }),
    }
}

fn company_prospector_template() -> TemplateDefinition {
    TemplateDefinition {
        id: template_id("company-prospector"),
        name: "Company Prospector".to_string(),
        metadata: TemplateMetadata {
            category: "automation".to_string(),
            difficulty: Difficulty::Advanced,
            estimated_minutes: Some(3),
        },
        steps: Vec::new(),
        body: Some(
            r#"const companies = {{companies}};
const maxResults = {{maxResults}};
const region = {{region}};
const rows = [];
for (const company of companies) {
  const page = await browser.search(company + " " + region);
  rows.push(await page.extract({ name: company, fields: ["website", "employees", "funding"] }));
  if (rows.length >= maxResults) break;
}
return { type: "table", title: "Prospect list", data: rows, columns: ["name", "website", "employees", "funding"] };
"#
            .to_string(),
        ),
        output: None,
    }
}

fn source_report_template() -> TemplateDefinition {
    TemplateDefinition {
        id: template_id("source-report"),
        name: "Source Report".to_string(),
        metadata: TemplateMetadata {
            category: "reporting".to_string(),
            difficulty: Difficulty::Beginner,
            estimated_minutes: Some(2),
        },
        steps: Vec::new(),
        body: Some(
            "Summarize the following source material for {{companyName}}.\n\
             Audience: {{role}}.\n\nMaterial:\n{{sourceText}}\n\n\
             Return concise markdown with a findings section and a risks section."
                .to_string(),
        ),
        output: Some(OutputSpec {
            output_type: OutputKind::Source,
            title: "Source summary for {{companyName}}".to_string(),
            template: "{{summary}}\n".to_string(),
        }),
    }
}

/// The templates every workspace ships with, validated through the same
/// loader path as user-supplied catalog files.
pub fn builtin_catalog() -> Catalog {
    Catalog::from_definitions([
        context_setup_template(),
        client_discovery_template(),
        company_prospector_template(),
        source_report_template(),
    ])
    .expect("built-in templates are valid")
}
