//! Reading one option out of one INI file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::ini::{Document, ParseError, DEFAULT_SECTION};
use crate::interpolate::{interpolate, InterpolationError};

/// A single read: which file, which section, which option.
///
/// All three fields are expected to be non-empty and `path` already
/// expanded; see [`crate::module::ModuleArgs::to_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: PathBuf,
    pub section: String,
    pub option: String,
}

impl Request {
    pub fn new(path: impl Into<PathBuf>, section: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            section: section.into(),
            option: option.into(),
        }
    }
}

/// How the file is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Expand `%(name)s` references (default: true)
    pub interpolation: bool,
    /// Section inherited by all others (default: `DEFAULT`)
    pub default_section: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            interpolation: true,
            default_section: DEFAULT_SECTION.to_string(),
        }
    }
}

/// Broad category of a failed read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    FileRead,
    SectionNotFound,
    OptionNotFound,
    Interpolation,
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The file is not UTF-8 and the requested value covers the bad bytes
    #[error("failed to read {}: value of {option} in [{section}] is not valid UTF-8", .path.display())]
    Undecodable {
        path: PathBuf,
        section: String,
        option: String,
    },

    #[error("section does not exist: {0}")]
    SectionNotFound(String),

    #[error("option does not exist: {0}")]
    OptionNotFound(String),

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

impl ReadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReadError::Io { .. } | ReadError::Syntax { .. } | ReadError::Undecodable { .. } => {
                FailureKind::FileRead
            }
            ReadError::SectionNotFound(_) => FailureKind::SectionNotFound,
            ReadError::OptionNotFound(_) => FailureKind::OptionNotFound,
            ReadError::Interpolation(_) => FailureKind::Interpolation,
        }
    }
}

/// Open, parse, and look up `request.option` in `request.section`.
pub fn read(request: &Request, options: &ParserOptions) -> Result<String, ReadError> {
    debug!(
        "reading [{}] {} from {}",
        request.section,
        request.option,
        request.path.display()
    );

    let contents = load(&request.path)?;
    let document =
        Document::parse_with(&contents.text, &options.default_section).map_err(|source| {
            ReadError::Syntax {
                path: request.path.clone(),
                source,
            }
        })?;

    let value = lookup(&document, &request.section, &request.option, options)?;
    if contents.lossy && value.contains(char::REPLACEMENT_CHARACTER) {
        return Err(ReadError::Undecodable {
            path: request.path.clone(),
            section: request.section.clone(),
            option: request.option.clone(),
        });
    }
    Ok(value)
}

/// Two-level lookup in an already parsed document.
pub fn lookup(
    document: &Document,
    section: &str,
    option: &str,
    options: &ParserOptions,
) -> Result<String, ReadError> {
    let scope = document
        .scope(section)
        .ok_or_else(|| ReadError::SectionNotFound(section.to_string()))?;
    let raw = scope
        .get(option)
        .ok_or_else(|| ReadError::OptionNotFound(option.to_string()))?;

    if !options.interpolation {
        return Ok(raw.to_string());
    }
    Ok(interpolate(section, option, raw, &scope)?)
}

/// File text, with `lossy` set when invalid UTF-8 had to be replaced
struct Contents {
    text: String,
    lossy: bool,
}

/// The file handle is dropped before parsing starts. Bytes that are not
/// UTF-8 (a Latin-1 comment, say) only matter if the requested value
/// contains them.
fn load(path: &Path) -> Result<Contents, ReadError> {
    let bytes = fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => Contents { text, lossy: false },
        Err(e) => {
            debug!("{} is not valid UTF-8, decoding lossily", path.display());
            Contents {
                text: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                lossy: true,
            }
        }
    })
}
