//! Renderers for depscope graphs and deltas: `dot`, `mermaid`, and
//! `json`, selected by name. Renderers are pure; they never touch the
//! filesystem.

mod dot;
mod error;
mod format;
mod json;
mod mermaid;
mod summary;

pub use error::{RenderError, Result};
pub use format::{parse_output_format, supported_formats, OutputFormat};
pub use summary::render_delta_summary;

use depscope_depgraph::{AnnotatedGraph, GraphDelta};

/// Render an annotated graph in the requested format.
pub fn render_graph(annotated: &AnnotatedGraph, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Dot => Ok(dot::render_graph(annotated)),
        OutputFormat::Mermaid => Ok(mermaid::render_graph(annotated)),
        OutputFormat::Json => json::render_graph(annotated),
    }
}

/// Render a snapshot delta in the requested format.
pub fn render_delta(delta: &GraphDelta, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Dot => Ok(dot::render_delta(delta)),
        OutputFormat::Mermaid => Ok(mermaid::render_delta(delta)),
        OutputFormat::Json => json::render_delta(delta),
    }
}
