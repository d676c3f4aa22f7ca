use crate::binder::{bind, BindingWarning, RenderContext, RenderMode, ValueBag};
use crate::catalog::OutputSpec;
use serde::{Deserialize, Serialize};

/// The persistable result of a completed run: the bound output template plus
/// its typed payload. Persistence itself belongs to an external collaborator;
/// the engine only shapes the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub title: String,
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRender {
    pub artifact: Artifact,
    pub warnings: Vec<BindingWarning>,
}

/// Bind an output spec against a final value bag. Title and body resolve
/// exactly like step-level templates, in human-readable mode.
pub fn render_output(spec: &OutputSpec, values: &ValueBag, ctx: &RenderContext) -> OutputRender {
    let title = bind(&spec.title, values, RenderMode::HumanReadable, ctx);
    let body = bind(&spec.template, values, RenderMode::HumanReadable, ctx);
    let mut warnings = title.warnings;
    warnings.extend(body.warnings);
    OutputRender {
        artifact: Artifact {
            title: title.text,
            content_type: spec.output_type.content_type().to_string(),
            body: body.text,
        },
        warnings,
    }
}
