use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, LevelFilter};
use read_ini::{
    find_config_file, generate_init_file, load_config, merge_output_mode, merge_parser_options,
    print_error, print_response, print_warning, run, should_use_colors, CliReadOptions,
    ModuleArgs, ModuleResponse, OutputContext, OutputMode, ReadIniToml,
};

#[derive(Parser)]
#[command(name = "read_ini")]
#[command(version, about = "Read a single option from a section of an INI file")]
struct Cli {
    /// Module arguments file (JSON object or key=value pairs)
    args_file: Option<PathBuf>,

    /// Path to the INI file (overrides the arguments file)
    #[arg(long, value_name = "PATH")]
    path: Option<String>,

    /// Section to read from (overrides the arguments file)
    #[arg(long, value_name = "NAME")]
    section: Option<String>,

    /// Option to read (overrides the arguments file)
    #[arg(long, value_name = "NAME")]
    option: Option<String>,

    /// Return the value without %(name)s substitution
    #[arg(long)]
    raw: bool,

    /// Section inherited by all others (default: DEFAULT)
    #[arg(long, value_name = "NAME")]
    default_section: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputMode>,

    /// Always color error output
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Never color error output
    #[arg(long)]
    no_color: bool,

    /// Log diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Generate a template read-ini.toml configuration file
    #[arg(long)]
    init: bool,

    /// Specify config file path (overrides auto-discovery)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let use_colors = should_use_colors(cli.color, cli.no_color);

    if cli.init {
        return handle_init(use_colors);
    }

    // Load configuration; a broken file only costs a warning
    let toml_config = load_configuration(&cli.config, use_colors);

    let cli_options = build_cli_options(&cli);
    let parser_options = merge_parser_options(&cli_options, toml_config.as_ref());
    let ctx = OutputContext::new(
        merge_output_mode(&cli_options, toml_config.as_ref()),
        use_colors,
    );

    let response = match load_module_args(&cli) {
        Ok(args) => run(&args, &parser_options),
        Err(e) => ModuleResponse::failed(e.to_string(), None),
    };

    print_response(&response, &ctx);
    ExitCode::from(response.exit_code())
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn handle_init(use_colors: bool) -> ExitCode {
    match generate_init_file() {
        Ok(path) => {
            println!("Created {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e.to_string(), &OutputContext::new(OutputMode::Text, use_colors));
            ExitCode::from(1)
        }
    }
}

fn load_configuration(explicit_path: &Option<PathBuf>, use_colors: bool) -> Option<ReadIniToml> {
    let config_path = explicit_path.clone().or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|d| find_config_file(&d))
    });

    config_path.and_then(|p| match load_config(&p) {
        Ok(config) => {
            debug!("using config {}", p.display());
            Some(config)
        }
        Err(e) => {
            print_warning(
                &format!("Failed to load {}: {}", p.display(), e),
                &OutputContext::new(OutputMode::Text, use_colors),
            );
            None
        }
    })
}

/// Flags given on the command line win over the arguments file.
fn load_module_args(cli: &Cli) -> Result<ModuleArgs, read_ini::ArgsError> {
    let overrides = ModuleArgs {
        path: cli.path.clone(),
        section: cli.section.clone(),
        option: cli.option.clone(),
    };

    match &cli.args_file {
        Some(file) => {
            debug!("loading module arguments from {}", file.display());
            Ok(overrides.or(ModuleArgs::from_file(file)?))
        }
        None => Ok(overrides),
    }
}

fn build_cli_options(cli: &Cli) -> CliReadOptions {
    // Boolean flags in clap are always present (default false), so we
    // treat false as "not set" for proper merging with config file.
    CliReadOptions {
        raw: cli.raw.then_some(true),
        default_section: cli.default_section.clone(),
        format: cli.format,
    }
}
