use std::io::{self, IsTerminal};

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub error: &'static str,
    pub warning: &'static str,
    enabled: bool,
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                error: "\x1b[31m",   // Red
                warning: "\x1b[33m", // Yellow
                enabled: true,
            }
        } else {
            Self {
                error: "",
                warning: "",
                enabled: false,
            }
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled {
            RESET
        } else {
            ""
        }
    }
}

/// Colors only ever decorate stderr; stdout carries the value or JSON.
pub fn should_use_colors(force_color: bool, no_color: bool) -> bool {
    // Priority: --no-color > --color > NO_COLOR env > TTY detection
    if no_color {
        return false;
    }
    if force_color {
        return true;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    io::stderr().is_terminal()
}
