//! `{placeholder}` substitution for endpoint path segments and query values.

use thiserror::Error;

/// Failure to render a route template. Reaching one of these at request time
/// means the static route table is inconsistent, which startup verification
/// is meant to rule out.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("placeholder '{{{name}}}' has no bound value in template '{template}'")]
    Unbound { name: String, template: String },

    #[error("unterminated placeholder in template '{template}'")]
    Unterminated { template: String },

    #[error("path segment '{segment}' rendered from '{template}' would be dropped from the URL")]
    DotSegment { segment: String, template: String },

    #[error("base URL '{base_url}' cannot carry path segments")]
    CannotBeBase { base_url: String },

    #[error("credential for {provider} is not a valid header value")]
    InvalidCredential { provider: String },
}

/// Names of every `{placeholder}` in a template, in order of appearance.
pub fn placeholders(template: &str) -> Result<Vec<&str>, TemplateError> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| TemplateError::Unterminated {
            template: template.to_string(),
        })?;
        names.push(&after[..end]);
        rest = &after[end + 1..];
    }
    Ok(names)
}

/// Substitutes every placeholder using `lookup`. Values are inserted verbatim;
/// encoding is left to the URL builder.
pub fn render<'a>(
    template: &str,
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| TemplateError::Unterminated {
            template: template.to_string(),
        })?;
        let name = &after[..end];
        let value = lookup(name).ok_or_else(|| TemplateError::Unbound {
            name: name.to_string(),
            template: template.to_string(),
        })?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
