//! TOML schema definitions for read-ini.toml

use serde::{Deserialize, Serialize};

use crate::output::OutputMode;

/// Root structure for read-ini.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReadIniToml {
    /// How INI files are interpreted
    #[serde(default)]
    pub parser: ParserSection,

    /// How results are reported
    #[serde(default)]
    pub output: OutputSection,
}

/// `[parser]` section in read-ini.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ParserSection {
    /// Expand `%(name)s` references (default: true)
    pub interpolation: Option<bool>,

    /// Section inherited by every other section (default: "DEFAULT")
    pub default_section: Option<String>,
}

/// `[output]` section in read-ini.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// "json" or "text" (default: "json")
    pub format: Option<OutputMode>,
}
