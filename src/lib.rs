pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod model;
pub mod output;
pub mod workbook;

pub use config::{CliArgs, ConvertConfig};
pub use error::{ConvertError, ConvertResult};
pub use graph::{
    AdjacencyGraph, BuildStats, GraphOutput, IdentifierRegistry, TableGraphBuilder, build_graph,
};
pub use logging::{LoggingConfig, init_logging};
pub use model::{CellValue, EntityId, Grid};
pub use output::OutputPaths;

use anyhow::{Context, Result};
use std::time::Instant;

/// What a finished run reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub paths: OutputPaths,
    pub entities: usize,
    pub stats: BuildStats,
}

impl ConversionSummary {
    /// The single line printed when a run completes.
    pub fn completion_message(&self, config: &ConvertConfig) -> String {
        format!(
            "{} has been converted to {} and {}",
            config.input.display(),
            self.paths.graph.display(),
            self.paths.id_map.display()
        )
    }
}

/// Loads the workbook, normalizes the table and writes both documents.
pub fn run(config: &ConvertConfig) -> Result<ConversionSummary> {
    let span = logging::conversion_span(&config.input.display().to_string());
    let _enter = span.enter();
    let started = Instant::now();

    let grid = workbook::load_grid(&config.input, config.sheet.as_deref())
        .with_context(|| format!("failed to load combination table from {:?}", config.input))?;

    let output = build_graph(&grid);

    let paths = config.output_paths();
    output::write_documents(&output, &paths).context("failed to write output documents")?;

    let summary = ConversionSummary {
        paths,
        entities: output.registry.len(),
        stats: output.stats,
    };

    if summary.stats.id_collisions > 0 {
        tracing::warn!(
            collisions = summary.stats.id_collisions,
            "some result entity ids reuse positional header ids"
        );
    }
    tracing::info!(
        entities = summary.entities,
        edges = summary.stats.edges,
        blank_cells = summary.stats.blank_cells,
        duration_ms = started.elapsed().as_millis() as u64,
        "conversion complete"
    );

    Ok(summary)
}
