use crate::binder::{bind, BoundTemplate, RenderContext, RenderMode, ValueBag};
use crate::catalog::TemplateDefinition;
use crate::run::EngineError;

/// Bind an automation template's body in code-literal mode: strings become
/// quoted escaped literals, numbers and booleans bare literals, lists JSON
/// array literals. The result is a standalone script fragment the
/// automation collaborator can execute as-is.
pub fn prepare_execution(
    template: &TemplateDefinition,
    variables: &ValueBag,
) -> Result<BoundTemplate, EngineError> {
    let body = template.body.as_ref().ok_or(EngineError::MissingBody {
        template_id: template.id.to_string(),
    })?;
    Ok(bind(
        body,
        variables,
        RenderMode::CodeLiteral,
        &RenderContext::default(),
    ))
}
