pub mod colors;
pub mod config;
pub mod ini;
pub mod interpolate;
pub mod module;
mod output;
pub mod reader;

pub use colors::{should_use_colors, Colors};
pub use config::{
    find_config_file, generate_init_file, load_config, merge_output_mode, merge_parser_options,
    CliReadOptions, ConfigError, ReadIniToml, READ_INI_TOML_TEMPLATE,
};
pub use ini::{Document, ParseError, Scope, Section, DEFAULT_SECTION};
pub use interpolate::{interpolate, InterpolationError};
pub use module::{ArgsError, Invocation, ModuleArgs, ModuleResponse, MODULE_NAME};
pub use output::{print_error, print_response, print_warning, OutputContext, OutputMode};
pub use reader::{lookup, read, FailureKind, ParserOptions, ReadError, Request};

use log::debug;

/// Main entry point: validate module arguments and perform the read.
///
/// Every outcome, including invalid arguments, becomes a response; the
/// caller only has to print it and exit with its code.
pub fn run(args: &ModuleArgs, options: &ParserOptions) -> ModuleResponse {
    let request = match args.to_request() {
        Ok(request) => request,
        Err(e) => return ModuleResponse::failed(e.to_string(), Some(args)),
    };

    match read(&request, options) {
        Ok(value) => ModuleResponse::succeeded(&request.path, value, Some(args)),
        Err(e) => {
            debug!("read failed ({:?}): {e}", e.kind());
            ModuleResponse::failed(e.to_string(), Some(args))
        }
    }
}
