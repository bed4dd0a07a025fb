//! Command templates.
//!
//! A template is a single command line with `{{.Name}}` placeholders. Only a
//! closed set of variables is known to the runner; there is no control flow.

use crate::error::TemplateError;
use regex::Regex;
use std::sync::LazyLock;

static ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("action pattern is valid"));

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").expect("variable pattern is valid")
});

fn check_literal(literal: &str, offset: usize) -> Result<(), TemplateError> {
    match literal.find("{{") {
        Some(pos) => Err(TemplateError::Parse {
            offset: offset + pos,
            reason: "unclosed action".to_string(),
        }),
        None => Ok(()),
    }
}

fn lookup<'a>(
    action: &str,
    vars: &[(&str, &'a str)],
    offset: usize,
) -> Result<&'a str, TemplateError> {
    let action = action.trim();
    if action.is_empty() {
        return Err(TemplateError::Parse {
            offset,
            reason: "missing value for action".to_string(),
        });
    }
    let name = VARIABLE
        .captures(action)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| TemplateError::Parse {
            offset,
            reason: format!("unsupported action '{action}'"),
        })?;
    vars.iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
        .ok_or_else(|| TemplateError::Parse {
            offset,
            reason: format!("unknown variable '.{name}'"),
        })
}

/// Substitute every `{{.Name}}` in `template` with its value from `vars`.
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in ACTION.captures_iter(template) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let literal = &template[last..whole.start()];
        check_literal(literal, last)?;
        out.push_str(literal);
        out.push_str(lookup(inner.as_str(), vars, whole.start())?);
        last = whole.end();
    }
    let tail = &template[last..];
    check_literal(tail, last)?;
    out.push_str(tail);
    Ok(out)
}

/// Split a rendered command on single spaces. Quoting is not supported, so
/// an argument can never contain a space.
pub fn split_args(rendered: &str) -> Result<Vec<String>, TemplateError> {
    let args: Vec<String> = rendered
        .split(' ')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if args.is_empty() {
        return Err(TemplateError::EmptyCommand);
    }
    Ok(args)
}

/// Render and split in one go.
pub fn render_args(template: &str, vars: &[(&str, &str)]) -> Result<Vec<String>, TemplateError> {
    split_args(&render(template, vars)?)
}
