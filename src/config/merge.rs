//! Configuration merging logic
//!
//! Priority: CLI args > read-ini.toml > defaults

use crate::output::OutputMode;
use crate::reader::ParserOptions;

use super::toml_schema::ReadIniToml;

/// CLI options that can override config file settings.
///
/// Uses `Option<T>` to distinguish "not specified" from "explicitly set".
#[derive(Debug, Default)]
pub struct CliReadOptions {
    /// If Some(true), skip interpolation (inverted in config)
    pub raw: Option<bool>,
    pub default_section: Option<String>,
    pub format: Option<OutputMode>,
}

/// Merge parser settings from CLI, TOML, and defaults.
pub fn merge_parser_options(cli: &CliReadOptions, toml: Option<&ReadIniToml>) -> ParserOptions {
    let defaults = ParserOptions::default();
    let parser = toml.map(|t| &t.parser);

    ParserOptions {
        interpolation: cli
            .raw
            .map(|raw| !raw)
            .or_else(|| parser.and_then(|p| p.interpolation))
            .unwrap_or(defaults.interpolation),
        default_section: cli
            .default_section
            .clone()
            .or_else(|| parser.and_then(|p| p.default_section.clone()))
            .unwrap_or(defaults.default_section),
    }
}

/// Merge the output format from CLI, TOML, and defaults.
pub fn merge_output_mode(cli: &CliReadOptions, toml: Option<&ReadIniToml>) -> OutputMode {
    cli.format
        .or_else(|| toml.and_then(|t| t.output.format))
        .unwrap_or_default()
}
