//! Embedded-expression template renderer.
//!
//! Understands the ERB tags that skeleton files actually use:
//!
//! | Tag              | Effect                                          |
//! |------------------|-------------------------------------------------|
//! | `<%= expr %>`    | Insert the value of `expr`                      |
//! | `<%# text %>`    | Comment, produces nothing                       |
//! | `<%%`            | Literal `<%`                                    |
//! | `... -%>`        | Swallow the newline directly after the tag      |
//!
//! An expression is a content-variable name followed by zero or more method
//! calls: `<%= namespace %>`, `<%= description.strip %>`,
//! `<%= package_name.upcase %>`.
//!
//! Statement tags (`<% if ... %>`) are rejected instead of being silently
//! copied into the output.

use thiserror::Error;

use crate::domain::variables::VariableMap;

/// Rendering failure with the 1-based line number of the offending tag.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErbError {
    #[error("line {line}: tag is never closed with '%>'")]
    UnterminatedTag { line: usize },

    #[error("line {line}: undefined variable '{name}'")]
    UndefinedVariable { line: usize, name: String },

    #[error("line {line}: unknown method '{method}'")]
    UnknownMethod { line: usize, method: String },

    #[error("line {line}: invalid expression '{expr}'")]
    InvalidExpression { line: usize, expr: String },

    #[error("line {line}: statement tags are not supported")]
    StatementTag { line: usize },
}

/// Render `source`, resolving expressions against `variables`.
pub fn render(source: &str, variables: &VariableMap) -> Result<String, ErbError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut line = 1;

    while let Some(start) = rest.find("<%") {
        let (text, tail) = rest.split_at(start);
        out.push_str(text);
        line += newlines(text);

        let after_open = &tail[2..];
        if let Some(after_escape) = after_open.strip_prefix('%') {
            out.push_str("<%");
            rest = after_escape;
            continue;
        }

        let end = after_open
            .find("%>")
            .ok_or(ErbError::UnterminatedTag { line })?;
        let raw_tag = &after_open[..end];
        let mut after_close = &after_open[end + 2..];

        let (tag, trim_newline) = match raw_tag.strip_suffix('-') {
            Some(tag) => (tag, true),
            None => (raw_tag, false),
        };

        match tag.chars().next() {
            Some('=') => out.push_str(&evaluate(tag[1..].trim(), variables, line)?),
            Some('#') => {}
            _ => return Err(ErbError::StatementTag { line }),
        }
        line += newlines(raw_tag);

        if trim_newline {
            if let Some(stripped) = after_close
                .strip_prefix("\r\n")
                .or_else(|| after_close.strip_prefix('\n'))
            {
                after_close = stripped;
                line += 1;
            }
        }

        rest = after_close;
    }

    out.push_str(rest);
    Ok(out)
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

fn evaluate(expr: &str, variables: &VariableMap, line: usize) -> Result<String, ErbError> {
    let mut parts = expr.split('.').map(str::trim);

    let name = parts.next().unwrap_or_default();
    if !is_identifier(name) {
        return Err(ErbError::InvalidExpression {
            line,
            expr: expr.to_owned(),
        });
    }

    let mut value = variables
        .get(name)
        .ok_or_else(|| ErbError::UndefinedVariable {
            line,
            name: name.to_owned(),
        })?
        .to_owned();

    for method in parts {
        let method = method.strip_suffix("()").unwrap_or(method);
        value = apply(method, value).ok_or_else(|| ErbError::UnknownMethod {
            line,
            method: method.to_owned(),
        })?;
    }

    Ok(value)
}

fn apply(method: &str, value: String) -> Option<String> {
    let result = match method {
        "to_s" => value,
        "upcase" => value.to_uppercase(),
        "downcase" => value.to_lowercase(),
        "strip" => value.trim().to_owned(),
        "chomp" => {
            let trimmed = value
                .strip_suffix("\r\n")
                .or_else(|| value.strip_suffix('\n'))
                .or_else(|| value.strip_suffix('\r'))
                .unwrap_or(&value);
            trimmed.to_owned()
        }
        "capitalize" => {
            let mut chars = value.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
                None => String::new(),
            }
        }
        _ => return None,
    };
    Some(result)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
