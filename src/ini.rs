//! INI document parsing.
//!
//! Option names keep the case they were written with, so `Key` and `key`
//! are distinct options. The defaults section (`[DEFAULT]` unless
//! configured otherwise) is kept apart from regular sections and is
//! inherited by all of them.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Name of the section whose options every other section inherits
pub const DEFAULT_SECTION: &str = "DEFAULT";

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]").unwrap());

static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:= \t\n\r\x0B\x0C][^:=]*)([:=])(.*)$").unwrap());

/// Whitespace as the INI grammar sees it: ASCII only, vertical tab included.
/// Non-breaking and other Unicode spaces are ordinary characters.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

fn trim_blank(s: &str) -> &str {
    s.trim_matches(is_blank)
}

/// A line that is neither a header, an option, a comment nor a continuation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLine {
    pub line: usize,
    pub text: String,
}

impl fmt::Display for InvalidLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {:>2}]: {:?}", self.line, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An option or other content appeared before the first `[section]`
    #[error("file contains no section headers (line {line}: {text:?})")]
    MissingSectionHeader { line: usize, text: String },

    #[error("file contains parsing errors: {}", join_lines(.0))]
    InvalidLines(Vec<InvalidLine>),
}

fn join_lines(lines: &[InvalidLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Options of one section, in the order they first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: Vec<(String, String)>,
}

impl Section {
    /// Exact, case-sensitive lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A repeated key replaces the earlier value but keeps its position.
    fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn append_line(&mut self, key: &str, line: &str) {
        if let Some((_, value)) = self.entries.iter_mut().find(|(k, _)| k == key) {
            value.push('\n');
            value.push_str(line);
        }
    }
}

/// Where option lines currently land while parsing
#[derive(Debug, Clone, Copy)]
enum Cursor {
    None,
    Defaults,
    Section(usize),
}

/// An in-memory parse of one INI file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    default_name: String,
    defaults: Section,
    sections: Vec<(String, Section)>,
}

impl Document {
    /// Parse `content` using `[DEFAULT]` as the defaults section.
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        Self::parse_with(content, DEFAULT_SECTION)
    }

    /// Parse `content`, treating `[default_section]` as the defaults section.
    ///
    /// Content before the first header is fatal. Other malformed lines are
    /// collected and reported together once the whole input has been read.
    pub fn parse_with(content: &str, default_section: &str) -> Result<Self, ParseError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut doc = Document {
            default_name: default_section.to_string(),
            defaults: Section::default(),
            sections: Vec::new(),
        };
        let mut cursor = Cursor::None;
        let mut current_option: Option<String> = None;
        let mut invalid = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if is_comment(line) {
                continue;
            }

            // Indented lines extend the previous option's value
            if line.starts_with(is_blank) {
                if let (Some(section), Some(option)) =
                    (doc.target_mut(cursor), current_option.as_deref())
                {
                    let value = trim_blank(line);
                    if !value.is_empty() {
                        section.append_line(option, value);
                    }
                    continue;
                }
            }

            if let Some(caps) = SECTION_HEADER.captures(line) {
                cursor = doc.open_section(&caps[1]);
                current_option = None;
                continue;
            }

            let Some(section) = doc.target_mut(cursor) else {
                return Err(ParseError::MissingSectionHeader {
                    line: idx + 1,
                    text: line.to_string(),
                });
            };

            match OPTION_LINE.captures(line) {
                Some(caps) => {
                    let key = caps[1].trim_end_matches(is_blank).to_string();
                    section.insert(key.clone(), clean_value(&caps[3]));
                    current_option = Some(key);
                }
                None => invalid.push(InvalidLine {
                    line: idx + 1,
                    text: line.to_string(),
                }),
            }
        }

        if invalid.is_empty() {
            Ok(doc)
        } else {
            Err(ParseError::InvalidLines(invalid))
        }
    }

    pub fn default_section_name(&self) -> &str {
        &self.default_name
    }

    pub fn defaults(&self) -> &Section {
        &self.defaults
    }

    /// Names of the regular sections, in file order. The defaults section
    /// is not listed.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, section)| section)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Resolve `name` to a lookup scope that falls back to the defaults.
    ///
    /// The defaults section name itself always resolves, to the defaults
    /// alone.
    pub fn scope(&self, name: &str) -> Option<Scope<'_>> {
        match self.section(name) {
            Some(section) => Some(Scope {
                section: Some(section),
                defaults: &self.defaults,
            }),
            None if name == self.default_name => Some(Scope {
                section: None,
                defaults: &self.defaults,
            }),
            None => None,
        }
    }

    fn target_mut(&mut self, cursor: Cursor) -> Option<&mut Section> {
        match cursor {
            Cursor::None => None,
            Cursor::Defaults => Some(&mut self.defaults),
            Cursor::Section(idx) => self.sections.get_mut(idx).map(|(_, s)| s),
        }
    }

    /// Re-opening a section that already exists merges into it.
    fn open_section(&mut self, name: &str) -> Cursor {
        if let Some(idx) = self.sections.iter().position(|(n, _)| n == name) {
            return Cursor::Section(idx);
        }
        if name == self.default_name {
            return Cursor::Defaults;
        }
        self.sections.push((name.to_string(), Section::default()));
        Cursor::Section(self.sections.len() - 1)
    }
}

/// A section seen together with the defaults it inherits.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    section: Option<&'a Section>,
    defaults: &'a Section,
}

impl<'a> Scope<'a> {
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.section
            .and_then(|s| s.get(key))
            .or_else(|| self.defaults.get(key))
    }
}

fn is_comment(line: &str) -> bool {
    if trim_blank(line).is_empty() || line.starts_with(['#', ';']) {
        return true;
    }
    // `REM`-style comments, only when unindented
    line.starts_with(['r', 'R'])
        && line
            .split(is_blank)
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("rem"))
}

/// Strip an inline `;` comment and surrounding whitespace from a raw value.
///
/// Whitespace after the delimiter is dropped first. After that only the
/// first `;` is considered, and only when whitespace precedes it, so a
/// value that starts with `;` is kept whole.
fn clean_value(raw: &str) -> String {
    let mut value = raw.trim_start_matches(is_blank);
    if let Some(pos) = value.find(';') {
        if pos > 0 && value[..pos].ends_with(is_blank) {
            value = &value[..pos];
        }
    }

    let value = trim_blank(value);
    if value == "\"\"" {
        String::new()
    } else {
        value.to_string()
    }
}
