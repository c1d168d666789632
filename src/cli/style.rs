use std::io::IsTerminal;

use colored::{Color, Colorize};

use crate::domain::Amount;

/// Terminal styling for command output.
#[derive(Debug, Clone)]
pub struct CliStyle {
    pub use_color: bool,
    pub decimal_separator: char,
}

impl CliStyle {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect(decimal_separator: char) -> Self {
        let use_color =
            std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            use_color,
            decimal_separator,
        }
    }

    pub fn header(&self, title: &str) -> String {
        if self.use_color {
            title.color(Color::BrightBlue).bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Amount right-aligned in `width` columns, red when negative.
    pub fn amount(&self, amount: Amount, width: usize) -> String {
        let text = format!("{:>width$}", amount.format(self.decimal_separator));
        if self.use_color && amount.is_negative() {
            text.red().to_string()
        } else {
            text
        }
    }

    pub fn muted(&self, text: &str) -> String {
        if self.use_color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}
