use crate::binder::value::ValueBag;
use crate::catalog::is_placeholder_identifier;

/// Rendering mode for a bind call site. Human-readable feeds AI prompts and
/// output documents; code-literal feeds generated script fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    HumanReadable,
    CodeLiteral,
}

/// Unknown placeholder encountered during a bind. Not an error; the token
/// resolved to the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingWarning {
    pub token: String,
}

impl std::fmt::Display for BindingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown placeholder `{{{{{}}}}}` resolved to empty", self.token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundTemplate {
    pub text: String,
    pub warnings: Vec<BindingWarning>,
}

/// Run-scoped context for reserved computed tokens, which resolve outside
/// the value bag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub logo_url: Option<String>,
    pub recipient_name: Option<String>,
}

impl RenderContext {
    fn resolve_reserved(&self, token: &str) -> Option<String> {
        match token {
            "logo" => Some(
                self.logo_url
                    .as_ref()
                    .map(|url| format!("<img src=\"{url}\" alt=\"logo\" />"))
                    .unwrap_or_default(),
            ),
            "recipient_name" => Some(
                self.recipient_name
                    .clone()
                    .unwrap_or_else(|| "[Recipient Name]".to_string()),
            ),
            _ => None,
        }
    }
}

/// Substitute every `{{identifier}}` occurrence in `template` from `values`.
///
/// Lenient by contract: unknown tokens resolve to the empty string with a
/// warning, a `{{` with no `}}` on the same line is copied through untouched,
/// and token text that is not a valid identifier is treated as literal text.
/// Binding never fails and has no side effects; required-field enforcement
/// happens at the step-validation boundary instead.
pub fn bind(
    template: &str,
    values: &ValueBag,
    mode: RenderMode,
    ctx: &RenderContext,
) -> BoundTemplate {
    let mut text = String::with_capacity(template.len());
    let mut warnings = Vec::new();
    let mut cursor = template;

    while let Some(start) = cursor.find("{{") {
        text.push_str(&cursor[..start]);
        let after_open = &cursor[start + 2..];

        // The closing braces must appear on the same logical line.
        let line_end = after_open.find('\n').unwrap_or(after_open.len());
        let close = after_open[..line_end].find("}}");

        let Some(close) = close else {
            text.push_str("{{");
            cursor = after_open;
            continue;
        };

        let token = after_open[..close].trim();
        if !is_placeholder_identifier(token) {
            text.push_str("{{");
            cursor = after_open;
            continue;
        }

        if let Some(resolved) = ctx.resolve_reserved(token) {
            text.push_str(&resolved);
        } else if let Some(value) = values.interpolation_value(token) {
            let rendered = match mode {
                RenderMode::HumanReadable => value.render_human(),
                RenderMode::CodeLiteral => value.render_code(),
            };
            text.push_str(&rendered);
        } else {
            warnings.push(BindingWarning {
                token: token.to_string(),
            });
        }
        cursor = &after_open[close + 2..];
    }

    text.push_str(cursor);
    BoundTemplate { text, warnings }
}
