// Replay recorded query streams through the assembler
use anyhow::{Context, Result};
use graphdesk_core::{AssemblerConfig, AssemblyDiagnostics, GraphAssembler, GraphData, GraphEvent};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of replaying one recorded stream
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub graph: GraphData,
    pub diagnostics: AssemblyDiagnostics,
    /// Events rejected as conflicting, with the reason
    pub rejected: Vec<String>,
}

/// Parse a JSON Lines stream of graph events. Blank lines are skipped.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<GraphEvent>> {
    let mut events = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", lineno + 1))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line)
            .with_context(|| format!("invalid graph event on line {}", lineno + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Feed events through a fresh assembler, flushing every `flush_every`
/// events the way a streaming workspace would
pub fn replay(events: Vec<GraphEvent>, config: AssemblerConfig, flush_every: Option<usize>) -> ReplayReport {
    let mut assembler = GraphAssembler::with_config(config);
    let mut rejected = Vec::new();

    for (i, event) in events.into_iter().enumerate() {
        if let Err(e) = assembler.ingest(event) {
            rejected.push(e.to_string());
        }
        if let Some(every) = flush_every.filter(|n| *n > 0) {
            if (i + 1) % every == 0 {
                let partial = assembler.flush();
                debug!(
                    "Partial snapshot after {} events: {} vertices, {} edges",
                    i + 1,
                    partial.vertices.len(),
                    partial.edges.len()
                );
            }
        }
    }

    let graph = assembler.finish();
    let diagnostics = assembler.diagnostics();
    info!(
        "Assembled {} vertices and {} edges ({} rejected, {} dropped edges, {} dropped links)",
        graph.vertices.len(),
        graph.edges.len(),
        rejected.len(),
        diagnostics.dropped_edges,
        diagnostics.dropped_links
    );

    ReplayReport {
        graph,
        diagnostics,
        rejected,
    }
}

pub fn replay_file<P: AsRef<Path>>(
    path: P,
    config: AssemblerConfig,
    flush_every: Option<usize>,
) -> Result<ReplayReport> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let events = read_events(BufReader::new(file))?;
    info!("Replaying {} events from {}", events.len(), path.display());
    Ok(replay(events, config, flush_every))
}
