//! # timeline-render
//!
//! Rendering backends for resolved timelines.
//!
//! This crate provides:
//! - MermaidJS Gantt chart rendering
//! - Chart title derivation from input file names
//! - A one-shot [`generate`] entry point: raw rows in, diagram text out
//!
//! ## Example
//!
//! ```rust
//! use timeline_core::{Column, RawRow};
//! use timeline_render::generate;
//!
//! let rows = vec![
//!     RawRow::new()
//!         .cell(Column::WorkStream, "Eng")
//!         .cell(Column::WorkPackage, "Design")
//!         .cell(Column::Start, "2024-01-01")
//!         .cell(Column::End, "2024-01-03")
//!         .cell(Column::PercentComplete, "100"),
//! ];
//!
//! let chart = generate(&rows, "Demo").unwrap();
//! assert!(chart.diagram.contains("Design :done, design, 2024-01-01, 2024-01-03"));
//! assert!(chart.failures.is_empty());
//! ```

pub mod mermaid;
pub mod title;

pub use mermaid::MermaidRenderer;
pub use title::{derive_title, DEFAULT_TITLE};

use serde::Serialize;
use timeline_core::{ChartRenderer, GenerateError, RawRow, RowFailure};
use timeline_solver::TimelineBuilder;

/// Diagram text plus the rows that were left out of it
#[derive(Clone, Debug, Serialize)]
pub struct ChartOutput {
    pub diagram: String,
    pub failures: Vec<RowFailure>,
}

/// Generate Mermaid text with default settings
pub fn generate(rows: &[RawRow], title: &str) -> Result<ChartOutput, GenerateError> {
    generate_with(&TimelineBuilder::new(), &MermaidRenderer::new(), rows, title)
}

/// Generate with an explicit builder and renderer
pub fn generate_with<R>(
    builder: &TimelineBuilder,
    renderer: &R,
    rows: &[RawRow],
    title: &str,
) -> Result<ChartOutput, GenerateError>
where
    R: ChartRenderer<Output = String>,
{
    let timeline = builder.build(rows)?;
    let diagram = renderer.render(&timeline, title)?;
    Ok(ChartOutput {
        diagram,
        failures: timeline.failures,
    })
}
