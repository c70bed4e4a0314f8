//! Error message formatting with actionable suggestions.
//!
//! A registry error prints as its message, an optional `help:` line and the
//! chain of underlying causes.

use super::colors::ColorSupport;
use pkgreg_core::RegistryError;
use std::error::Error;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    /// Format an error with context and suggestions
    pub fn format_error(&self, error: &RegistryError) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.dim("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        let mut source = error.source();
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }

        output
    }

    /// Format a simple error message
    pub fn format_simple(&self, message: &str) -> String {
        format!("{}: {}", self.colors.red("error"), message)
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
