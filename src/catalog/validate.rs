use crate::catalog::error::CatalogError;
use crate::catalog::template_file::{FieldComponent, StepDefinition, TemplateDefinition};
use std::collections::HashSet;

fn validation_error(template: &TemplateDefinition, reason: impl Into<String>) -> CatalogError {
    CatalogError::Validation {
        template_id: template.id.to_string(),
        reason: reason.into(),
    }
}

/// Structural checks applied once at load time. A definition that fails here
/// never reaches the run-time engine.
pub fn validate_template(template: &TemplateDefinition) -> Result<(), CatalogError> {
    if template.name.trim().is_empty() {
        return Err(validation_error(template, "template name must be non-empty"));
    }
    if template.steps.is_empty() && template.body.is_none() {
        return Err(validation_error(
            template,
            "template must declare steps or a single-shot body",
        ));
    }

    let mut step_ids = HashSet::new();
    for step in &template.steps {
        if !step_ids.insert(step.id.as_str()) {
            return Err(validation_error(
                template,
                format!("duplicate step id `{}`", step.id),
            ));
        }
        validate_step(template, step)?;
    }

    if let Some(output) = &template.output {
        if output.title.trim().is_empty() {
            return Err(validation_error(
                template,
                "output title template must be non-empty",
            ));
        }
        if output.template.trim().is_empty() {
            return Err(validation_error(
                template,
                "output body template must be non-empty",
            ));
        }
    }

    Ok(())
}

fn validate_step(template: &TemplateDefinition, step: &StepDefinition) -> Result<(), CatalogError> {
    let mut state_keys = HashSet::new();
    for component in &step.components {
        if !state_keys.insert(component.state_key().as_str()) {
            return Err(validation_error(
                template,
                format!(
                    "step `{}` declares state key `{}` more than once",
                    step.id,
                    component.state_key()
                ),
            ));
        }
        validate_component(template, step, component)?;
    }

    if step.ai_enhanced
        && !step
            .components
            .iter()
            .any(|component| matches!(component, FieldComponent::AiGenerate { .. }))
    {
        return Err(validation_error(
            template,
            format!(
                "step `{}` is marked ai_enhanced but has no ai_generate component",
                step.id
            ),
        ));
    }

    Ok(())
}

fn validate_component(
    template: &TemplateDefinition,
    step: &StepDefinition,
    component: &FieldComponent,
) -> Result<(), CatalogError> {
    let key = component.state_key();
    match component {
        FieldComponent::Slider { min, max, .. } => {
            if min > max {
                return Err(validation_error(
                    template,
                    format!(
                        "step `{}` slider `{key}` has min {min} greater than max {max}",
                        step.id
                    ),
                ));
            }
        }
        FieldComponent::NumberInput {
            min: Some(min),
            max: Some(max),
            ..
        } => {
            if min > max {
                return Err(validation_error(
                    template,
                    format!(
                        "step `{}` number input `{key}` has min {min} greater than max {max}",
                        step.id
                    ),
                ));
            }
        }
        FieldComponent::Dropdown { options, .. }
        | FieldComponent::CardSelector { options, .. }
        | FieldComponent::CheckboxList { options, .. }
        | FieldComponent::ButtonGroup { options, .. } => {
            if options.is_empty() {
                return Err(validation_error(
                    template,
                    format!(
                        "step `{}` {} `{key}` must declare at least one option",
                        step.id,
                        component.kind_str()
                    ),
                ));
            }
            let mut values = HashSet::new();
            for option in options {
                if !values.insert(option.value.as_str()) {
                    return Err(validation_error(
                        template,
                        format!(
                            "step `{}` {} `{key}` has duplicate option value `{}`",
                            step.id,
                            component.kind_str(),
                            option.value
                        ),
                    ));
                }
            }
        }
        FieldComponent::AiGenerate { prompt, .. } | FieldComponent::AiSummary { prompt, .. } => {
            if prompt.trim().is_empty() {
                return Err(validation_error(
                    template,
                    format!(
                        "step `{}` {} `{key}` must declare a non-empty prompt",
                        step.id,
                        component.kind_str()
                    ),
                ));
            }
        }
        _ => {}
    }
    Ok(())
}
