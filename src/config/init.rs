//! Template generation for `--init` command

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::file::CONFIG_FILE_NAME;

/// Template read-ini.toml with documentation
pub const READ_INI_TOML_TEMPLATE: &str = r#"# read-ini.toml - Configuration for read_ini
#
# read_ini returns the value of one option from one section of an INI file.
# Option and section names are always matched case-sensitively.
#
# The settings below are optional - uncomment and modify as needed.
# Command-line flags take precedence over this file.

[parser]
# Expand %(name)s references to other options in the same section
# (or the default section). Disable to return values verbatim.
# Default: true
# interpolation = true

# Section whose options every other section inherits.
# Default: "DEFAULT"
# default_section = "DEFAULT"

[output]
# "json" prints a result object for orchestration tools,
# "text" prints only the value.
# Default: "json"
# format = "json"
"#;

/// Generate read-ini.toml in the specified directory (or current directory if None).
///
/// Returns an error if read-ini.toml already exists.
pub fn generate_init_file_in(dir: Option<&Path>) -> io::Result<PathBuf> {
    let path = dir.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), |d| d.join(CONFIG_FILE_NAME));

    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{CONFIG_FILE_NAME} already exists"),
        ));
    }

    fs::write(&path, READ_INI_TOML_TEMPLATE)?;
    Ok(path)
}

/// Generate read-ini.toml in the current directory.
///
/// Returns an error if read-ini.toml already exists.
pub fn generate_init_file() -> io::Result<PathBuf> {
    generate_init_file_in(None)
}
