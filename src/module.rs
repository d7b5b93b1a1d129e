//! The orchestration boundary: module arguments in, structured result out.
//!
//! Arguments arrive either as a JSON object (optionally wrapped in
//! `ANSIBLE_MODULE_ARGS`) or as legacy whitespace-separated `key=value`
//! pairs. Results are reported as a JSON object with `changed`/`value` on
//! success and `failed`/`msg` on failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::reader::Request;

pub const MODULE_NAME: &str = "read_ini";

/// Parameters in the order they are reported when missing
const PARAMETERS: [&str; 3] = ["path", "section", "option"];

/// Key that wraps parameters in argument files written by the engine
const WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";

/// Engine-internal keys, accepted and ignored
const INTERNAL_PREFIX: &str = "_ansible_";

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("failed to read arguments file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed module arguments: {0}")]
    Malformed(String),

    #[error("Unsupported parameters for (read_ini) module: {}. Supported parameters include: option, path, section", .0.join(", "))]
    Unsupported(Vec<String>),

    #[error("argument {name} is of type {kind} and we were unable to convert to str")]
    NotAString { name: String, kind: &'static str },

    #[error("missing required arguments: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("argument {0} must not be empty")]
    Empty(&'static str),
}

/// Raw module parameters, before validation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleArgs {
    pub path: Option<String>,
    pub section: Option<String>,
    pub option: Option<String>,
}

impl ModuleArgs {
    /// Load parameters from an arguments file.
    pub fn from_file(path: &Path) -> Result<Self, ArgsError> {
        let text = fs::read_to_string(path).map_err(|source| ArgsError::File {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse JSON when the text looks like an object, `key=value` pairs otherwise.
    pub fn parse(text: &str) -> Result<Self, ArgsError> {
        if text.trim_start().starts_with('{') {
            let value: Value =
                serde_json::from_str(text).map_err(|e| ArgsError::Malformed(e.to_string()))?;
            Self::from_json(value)
        } else {
            Self::from_pairs(text)
        }
    }

    pub fn from_json(value: Value) -> Result<Self, ArgsError> {
        let Value::Object(mut map) = value else {
            return Err(ArgsError::Malformed("expected a JSON object".into()));
        };
        if let Some(inner) = map.remove(WRAPPER_KEY) {
            return match inner {
                Value::Object(inner) => Self::from_map(inner),
                _ => Err(ArgsError::Malformed(format!("{WRAPPER_KEY} must be an object"))),
            };
        }
        Self::from_map(map)
    }

    fn from_map(map: Map<String, Value>) -> Result<Self, ArgsError> {
        check_supported(map.keys().map(String::as_str))?;

        let mut args = Self::default();
        for (key, value) in map {
            let Some(slot) = args.slot_mut(&key) else {
                continue;
            };
            *slot = json_to_text(&key, value)?;
        }
        Ok(args)
    }

    /// Parse `key=value` pairs; values may be single- or double-quoted.
    pub fn from_pairs(text: &str) -> Result<Self, ArgsError> {
        let pairs = split_pairs(text)?;
        check_supported(pairs.iter().map(|(k, _)| k.as_str()))?;

        let mut args = Self::default();
        for (key, value) in pairs {
            if let Some(slot) = args.slot_mut(&key) {
                *slot = Some(value);
            }
        }
        Ok(args)
    }

    /// Fill in anything `self` leaves unset from `other`.
    pub fn or(self, other: ModuleArgs) -> ModuleArgs {
        ModuleArgs {
            path: self.path.or(other.path),
            section: self.section.or(other.section),
            option: self.option.or(other.option),
        }
    }

    /// Validate the parameters and build a request with `~` expanded.
    ///
    /// Only the current user's home is expanded (`~`, `~/...`); `~user/...`
    /// is passed through verbatim and fails at open time if it does not
    /// exist literally.
    pub fn to_request(&self) -> Result<Request, ArgsError> {
        let (Some(path), Some(section), Some(option)) = (&self.path, &self.section, &self.option)
        else {
            return Err(ArgsError::Missing(self.missing()));
        };

        for (name, value) in PARAMETERS.into_iter().zip([path, section, option]) {
            if value.is_empty() {
                return Err(ArgsError::Empty(name));
            }
        }

        let expanded = shellexpand::tilde(path).into_owned();
        Ok(Request::new(expanded, section.as_str(), option.as_str()))
    }

    fn missing(&self) -> Vec<&'static str> {
        PARAMETERS
            .into_iter()
            .zip([&self.path, &self.section, &self.option])
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "path" => Some(&mut self.path),
            "section" => Some(&mut self.section),
            "option" => Some(&mut self.option),
            _ => None,
        }
    }
}

fn check_supported<'a>(keys: impl Iterator<Item = &'a str>) -> Result<(), ArgsError> {
    let mut unsupported: Vec<String> = keys
        .filter(|key| !key.starts_with(INTERNAL_PREFIX) && !PARAMETERS.contains(key))
        .map(String::from)
        .collect();

    if unsupported.is_empty() {
        return Ok(());
    }
    unsupported.sort();
    Err(ArgsError::Unsupported(unsupported))
}

/// `null` counts as not provided; scalars are converted to their text.
fn json_to_text(name: &str, value: Value) -> Result<Option<String>, ArgsError> {
    let kind = match value {
        Value::Null => return Ok(None),
        Value::String(s) => return Ok(Some(s)),
        Value::Bool(b) => return Ok(Some(b.to_string())),
        Value::Number(n) => return Ok(Some(n.to_string())),
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    };
    Err(ArgsError::NotAString {
        name: name.to_string(),
        kind,
    })
}

/// Split `a=1 b='two words' c="x \"y\""` into key/value pairs.
fn split_pairs(text: &str) -> Result<Vec<(String, String)>, ArgsError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some('"') if c == '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ArgsError::Malformed("unterminated quote".into()));
    }
    if in_token {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .map(|token| match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(ArgsError::Malformed(format!(
                "expected key=value, found '{token}'"
            ))),
        })
        .collect()
}

/// Echo of the parameters the module was called with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub module_args: ModuleArgs,
}

/// What the engine receives back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModuleResponse {
    Success {
        changed: bool,
        path: String,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        invocation: Option<Invocation>,
    },
    Failure {
        failed: bool,
        msg: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        invocation: Option<Invocation>,
    },
}

impl ModuleResponse {
    /// A successful read always reports `changed: true`.
    pub fn succeeded(path: &Path, value: String, args: Option<&ModuleArgs>) -> Self {
        ModuleResponse::Success {
            changed: true,
            path: path.display().to_string(),
            value,
            invocation: args.map(invocation),
        }
    }

    pub fn failed(msg: impl Into<String>, args: Option<&ModuleArgs>) -> Self {
        ModuleResponse::Failure {
            failed: true,
            msg: msg.into(),
            invocation: args.map(invocation),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ModuleResponse::Failure { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_failure() {
            1
        } else {
            0
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn invocation(args: &ModuleArgs) -> Invocation {
    Invocation {
        module_args: args.clone(),
    }
}
