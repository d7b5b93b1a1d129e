//! `%(name)s` substitution in option values.
//!
//! Substitution happens on lookup, with names resolved in the same scope as
//! the option being read. A value is only rewritten when it contains `%(`;
//! in that case `%%` stands for a literal percent sign and any other `%`
//! is an error.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::ini::Scope;

/// Substitution passes before a value is considered self-referential
pub const MAX_DEPTH: usize = 10;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%\(([^)]*)\)s|%%|%").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("bad value substitution: section [{section}] option {option} references missing key {key} (raw value: {raw:?})")]
    MissingKey {
        section: String,
        option: String,
        key: String,
        raw: String,
    },

    #[error("bad value substitution: section [{section}] option {option} exceeds the maximum substitution depth (raw value: {raw:?})")]
    TooDeep {
        section: String,
        option: String,
        raw: String,
    },

    #[error("bad value substitution: section [{section}] option {option} has a '%' not followed by '%' or '(name)s' (raw value: {raw:?})")]
    Syntax {
        section: String,
        option: String,
        raw: String,
    },
}

enum Failure {
    Missing(String),
    Stray,
}

/// Expand `raw`, the value of `option` in `section`, against `scope`.
pub fn interpolate(
    section: &str,
    option: &str,
    raw: &str,
    scope: &Scope<'_>,
) -> Result<String, InterpolationError> {
    let mut value = raw.to_string();

    for _ in 0..MAX_DEPTH {
        if !value.contains("%(") {
            return Ok(value);
        }
        value = substitute_once(&value, scope).map_err(|failure| match failure {
            Failure::Missing(key) => InterpolationError::MissingKey {
                section: section.to_string(),
                option: option.to_string(),
                key,
                raw: raw.to_string(),
            },
            Failure::Stray => InterpolationError::Syntax {
                section: section.to_string(),
                option: option.to_string(),
                raw: raw.to_string(),
            },
        })?;
    }

    if value.contains("%(") {
        return Err(InterpolationError::TooDeep {
            section: section.to_string(),
            option: option.to_string(),
            raw: raw.to_string(),
        });
    }
    Ok(value)
}

fn substitute_once(value: &str, scope: &Scope<'_>) -> Result<String, Failure> {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for token in TOKEN.find_iter(value) {
        out.push_str(&value[last..token.start()]);

        let text = token.as_str();
        if text == "%%" {
            out.push('%');
        } else if let Some(key) = text.strip_prefix("%(").and_then(|t| t.strip_suffix(")s")) {
            let replacement = scope
                .get(key)
                .ok_or_else(|| Failure::Missing(key.to_string()))?;
            out.push_str(replacement);
        } else {
            return Err(Failure::Stray);
        }

        last = token.end();
    }

    out.push_str(&value[last..]);
    Ok(out)
}
