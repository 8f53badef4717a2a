//! Output format selection.

use crate::error::{RenderError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Dot,
    Mermaid,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Mermaid => "mermaid",
            OutputFormat::Json => "json",
        }
    }

    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Dot, OutputFormat::Mermaid, OutputFormat::Json]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a user-supplied format name; unknown names list the options.
pub fn parse_output_format(name: &str) -> Result<OutputFormat> {
    match name.trim().to_ascii_lowercase().as_str() {
        "dot" => Ok(OutputFormat::Dot),
        "mermaid" => Ok(OutputFormat::Mermaid),
        "json" => Ok(OutputFormat::Json),
        _ => Err(RenderError::UnknownFormat {
            name: name.to_string(),
            valid: supported_formats(),
        }),
    }
}

/// Comma-separated list of valid format names, for help text and errors.
pub fn supported_formats() -> String {
    OutputFormat::all()
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
