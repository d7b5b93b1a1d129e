use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::colors::Colors;
use crate::module::ModuleResponse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Structured result object on stdout
    #[default]
    Json,
    /// Bare value on stdout, errors on stderr
    Text,
}

pub struct OutputContext {
    pub mode: OutputMode,
    pub colors: Colors,
}

impl OutputContext {
    pub fn new(mode: OutputMode, use_colors: bool) -> Self {
        Self {
            mode,
            colors: Colors::new(use_colors),
        }
    }
}

pub fn print_response(response: &ModuleResponse, ctx: &OutputContext) {
    match ctx.mode {
        OutputMode::Json => print_json(response, ctx),
        OutputMode::Text => print_text(response, ctx),
    }
}

fn print_json(response: &ModuleResponse, ctx: &OutputContext) {
    match response.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("failed to encode result: {e}"), ctx),
    }
}

fn print_text(response: &ModuleResponse, ctx: &OutputContext) {
    match response {
        ModuleResponse::Success { value, .. } => println!("{value}"),
        ModuleResponse::Failure { msg, .. } => print_error(msg, ctx),
    }
}

pub fn print_error(msg: &str, ctx: &OutputContext) {
    eprintln!("{}Error:{} {msg}", ctx.colors.error, ctx.colors.reset());
}

pub fn print_warning(msg: &str, ctx: &OutputContext) {
    eprintln!("{}Warning:{} {msg}", ctx.colors.warning, ctx.colors.reset());
}
