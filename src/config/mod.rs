//! Configuration file support for read-ini.
//!
//! This module provides:
//! - Loading configuration from `read-ini.toml`
//! - Config file discovery (search upward from current directory)
//! - Merging CLI args, config file, and defaults
//! - Template generation with `--init`

mod file;
mod init;
mod merge;
mod toml_schema;

pub use file::{find_config_file, find_file_upward, load_config, ConfigError, CONFIG_FILE_NAME};
pub use init::{generate_init_file, generate_init_file_in, READ_INI_TOML_TEMPLATE};
pub use merge::{merge_output_mode, merge_parser_options, CliReadOptions};
pub use toml_schema::{OutputSection, ParserSection, ReadIniToml};
