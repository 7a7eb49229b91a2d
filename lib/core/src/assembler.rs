//! Incremental graph assembly
//!
//! Folds the element stream a query emits into [`GraphData`] snapshots.
//! The stream is best-effort and unordered: edges may arrive before their
//! endpoints, edges may arrive as two one-sided fragments, and explanation
//! links may reference elements that show up later (or never).
//!
//! Unresolved elements wait in pending tables and are never part of a
//! snapshot. They are dropped, and counted, only when the stream ends.

use crate::graph::{
    Edge, EdgeDirection, EdgeId, ExplanationEdge, ExplanationVertex, GraphData,
    GraphEvent, IncompleteEdge, Vertex, VertexId,
};
use crate::{Error, Result};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Configuration for a graph assembler
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// How many element ingestions an explanation link may wait for its
    /// referent before it is given up on
    pub max_link_retries: u64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_link_retries: 1024,
        }
    }
}

/// Counters describing what the assembler could not (yet) place
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyDiagnostics {
    /// Fragments and edges still waiting for an endpoint
    pub pending_edges: usize,
    /// Explanation links still waiting for their vertex or edge
    pub pending_links: usize,
    pub dropped_edges: usize,
    pub dropped_links: usize,
    pub duplicate_vertices: usize,
    pub duplicate_edges: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingLink<T> {
    link: T,
    queued_at: u64,
}

type EdgeIds = SmallVec<[EdgeId; 4]>;

/// Stateful builder for one query's graph.
///
/// Snapshots keep first-resolution order: once an element has been
/// emitted it keeps its position, and newly resolved elements are
/// appended, so repeated flushes only ever grow the graph.
pub struct GraphAssembler {
    config: AssemblerConfig,

    vertices: Vec<Vertex>,
    vertex_index: AHashMap<VertexId, usize>,
    edges: Vec<Edge>,
    edge_index: AHashMap<EdgeId, usize>,

    // Fully specified edges whose endpoint vertices have not all arrived
    awaiting: AHashMap<EdgeId, Edge>,
    awaiting_by_vertex: AHashMap<VertexId, EdgeIds>,

    fragments: AHashMap<EdgeId, IncompleteEdge>,
    fragments_by_anchor: AHashMap<(VertexId, EdgeDirection), EdgeIds>,

    vertex_links: Vec<ExplanationVertex>,
    vertex_link_set: AHashSet<ExplanationVertex>,
    edge_links: Vec<ExplanationEdge>,
    edge_link_set: AHashSet<ExplanationEdge>,
    pending_vertex_links: AHashMap<VertexId, Vec<PendingLink<ExplanationVertex>>>,
    pending_edge_links: AHashMap<EdgeId, Vec<PendingLink<ExplanationEdge>>>,

    // Bumped on every vertex or edge that enters the snapshot
    ingested: u64,

    dropped_edges: usize,
    dropped_links: usize,
    duplicate_vertices: usize,
    duplicate_edges: usize,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::with_config(AssemblerConfig::default())
    }

    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            config,
            vertices: Vec::new(),
            vertex_index: AHashMap::new(),
            edges: Vec::new(),
            edge_index: AHashMap::new(),
            awaiting: AHashMap::new(),
            awaiting_by_vertex: AHashMap::new(),
            fragments: AHashMap::new(),
            fragments_by_anchor: AHashMap::new(),
            vertex_links: Vec::new(),
            vertex_link_set: AHashSet::new(),
            edge_links: Vec::new(),
            edge_link_set: AHashSet::new(),
            pending_vertex_links: AHashMap::new(),
            pending_edge_links: AHashMap::new(),
            ingested: 0,
            dropped_edges: 0,
            dropped_links: 0,
            duplicate_vertices: 0,
            duplicate_edges: 0,
        }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Apply a single stream event
    pub fn ingest(&mut self, event: GraphEvent) -> Result<()> {
        match event {
            GraphEvent::VertexSeen(vertex) => {
                self.ingest_vertex(vertex);
                Ok(())
            }
            GraphEvent::EdgeSeen(edge) => self.ingest_edge(edge),
            GraphEvent::IncompleteEdgeSeen(fragment) => self.ingest_incomplete_edge(fragment),
            GraphEvent::FragmentsCompleted {
                anchor,
                direction,
                vertex,
            } => {
                self.complete_fragments(anchor, direction, vertex);
                Ok(())
            }
            GraphEvent::ExplanationVertexSeen(link) => {
                self.ingest_explanation_vertex(link);
                Ok(())
            }
            GraphEvent::ExplanationEdgeSeen(link) => {
                self.ingest_explanation_edge(link);
                Ok(())
            }
        }
    }

    /// Apply every event, skipping (and returning) the ones that conflict
    pub fn ingest_all<I>(&mut self, events: I) -> Vec<Error>
    where
        I: IntoIterator<Item = GraphEvent>,
    {
        let mut rejected = Vec::new();
        for event in events {
            if let Err(e) = self.ingest(event) {
                warn!("Rejected graph event: {}", e);
                rejected.push(e);
            }
        }
        rejected
    }

    /// Add a vertex. A vertex id seen before keeps its first-seen data.
    pub fn ingest_vertex(&mut self, vertex: Vertex) {
        if self.vertex_index.contains_key(&vertex.id) {
            self.duplicate_vertices += 1;
            return;
        }

        let id = vertex.id;
        self.vertex_index.insert(id, self.vertices.len());
        self.vertices.push(vertex);
        self.ingested += 1;

        self.attach_vertex_links(id);
        self.promote_awaiting(id);
    }

    /// Add a fully specified edge
    pub fn ingest_edge(&mut self, edge: Edge) -> Result<()> {
        if let Some(existing) = self.lookup_edge(edge.id) {
            if existing.source == edge.source && existing.target == edge.target {
                self.duplicate_edges += 1;
                return Ok(());
            }
            return Err(Error::conflict(
                edge.id,
                format!(
                    "already {} -> {}, reported again as {} -> {}",
                    existing.source, existing.target, edge.source, edge.target
                ),
            ));
        }

        if let Some(fragment) = self.fragments.get(&edge.id) {
            if edge.endpoint(fragment.direction) != fragment.anchor {
                return Err(Error::conflict(
                    edge.id,
                    format!(
                        "fragment anchored at {} ({:?}) disagrees with {} -> {}",
                        fragment.anchor, fragment.direction, edge.source, edge.target
                    ),
                ));
            }
            self.remove_fragment(edge.id);
        }

        self.place_edge(edge);
        Ok(())
    }

    /// Add one side of an edge.
    ///
    /// Two fragments with the same id and opposite directions make a full
    /// edge. A lone fragment waits until its complement arrives or
    /// [`complete_fragments`](Self::complete_fragments) names its far end.
    pub fn ingest_incomplete_edge(&mut self, fragment: IncompleteEdge) -> Result<()> {
        if let Some(existing) = self.lookup_edge(fragment.id) {
            if existing.endpoint(fragment.direction) == fragment.anchor {
                self.duplicate_edges += 1;
                return Ok(());
            }
            return Err(Error::conflict(
                fragment.id,
                format!(
                    "fragment anchored at {} ({:?}) disagrees with {} -> {}",
                    fragment.anchor, fragment.direction, existing.source, existing.target
                ),
            ));
        }

        if let Some(pending) = self.fragments.get(&fragment.id) {
            if pending.direction == fragment.direction {
                if pending.anchor == fragment.anchor {
                    self.duplicate_edges += 1;
                    return Ok(());
                }
                return Err(Error::conflict(
                    fragment.id,
                    format!(
                        "two {:?} fragments anchored at {} and {}",
                        fragment.direction, pending.anchor, fragment.anchor
                    ),
                ));
            }

            if let Some(pending) = self.remove_fragment(fragment.id) {
                let edge = pending.complete(fragment.anchor);
                self.place_edge(edge);
            }
            return Ok(());
        }

        self.fragments_by_anchor
            .entry((fragment.anchor, fragment.direction))
            .or_default()
            .push(fragment.id);
        self.fragments.insert(fragment.id, fragment);
        Ok(())
    }

    /// Resolve every fragment anchored at `anchor` in `direction` to end at
    /// `far`. Returns how many fragments were promoted.
    pub fn complete_fragments(
        &mut self,
        anchor: VertexId,
        direction: EdgeDirection,
        far: VertexId,
    ) -> usize {
        let Some(ids) = self.fragments_by_anchor.remove(&(anchor, direction)) else {
            return 0;
        };

        let mut promoted = 0;
        for id in ids {
            if let Some(fragment) = self.fragments.remove(&id) {
                self.place_edge(fragment.complete(far));
                promoted += 1;
            }
        }
        promoted
    }

    pub fn ingest_explanation_vertex(&mut self, link: ExplanationVertex) {
        if self.vertex_index.contains_key(&link.vertex_id) {
            self.add_vertex_link(link);
        } else {
            self.pending_vertex_links
                .entry(link.vertex_id)
                .or_default()
                .push(PendingLink {
                    link,
                    queued_at: self.ingested,
                });
        }
    }

    pub fn ingest_explanation_edge(&mut self, link: ExplanationEdge) {
        if self.edge_index.contains_key(&link.edge_id) {
            self.add_edge_link(link);
        } else {
            self.pending_edge_links
                .entry(link.edge_id)
                .or_default()
                .push(PendingLink {
                    link,
                    queued_at: self.ingested,
                });
        }
    }

    /// Snapshot everything resolved so far. Pending elements are kept for
    /// later flushes; explanation links past their retry bound are dropped.
    pub fn flush(&mut self) -> GraphData {
        self.evict_expired_links();
        debug!(
            "Flushing graph: {} vertices, {} edges, {} pending edges",
            self.vertices.len(),
            self.edges.len(),
            self.awaiting.len() + self.fragments.len()
        );
        self.snapshot()
    }

    /// End of stream: drop whatever never resolved and return the final snapshot
    pub fn finish(&mut self) -> GraphData {
        self.evict_expired_links();

        let unresolved_edges = self.awaiting.len() + self.fragments.len();
        let unresolved_links = self.pending_link_count();
        if unresolved_edges > 0 || unresolved_links > 0 {
            warn!(
                "Dropping {} unresolved edges and {} unresolved explanation links",
                unresolved_edges, unresolved_links
            );
        }

        self.dropped_edges += unresolved_edges;
        self.dropped_links += unresolved_links;
        self.awaiting.clear();
        self.awaiting_by_vertex.clear();
        self.fragments.clear();
        self.fragments_by_anchor.clear();
        self.pending_vertex_links.clear();
        self.pending_edge_links.clear();

        self.snapshot()
    }

    /// Forget everything; called when a new query starts
    pub fn reset(&mut self) {
        *self = Self::with_config(self.config.clone());
    }

    pub fn diagnostics(&self) -> AssemblyDiagnostics {
        AssemblyDiagnostics {
            pending_edges: self.awaiting.len() + self.fragments.len(),
            pending_links: self.pending_link_count(),
            dropped_edges: self.dropped_edges,
            dropped_links: self.dropped_links,
            duplicate_vertices: self.duplicate_vertices,
            duplicate_edges: self.duplicate_edges,
        }
    }

    fn snapshot(&self) -> GraphData {
        GraphData {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            explanation_vertices: self.vertex_links.clone(),
            explanation_edges: self.edge_links.clone(),
        }
    }

    fn lookup_edge(&self, id: EdgeId) -> Option<&Edge> {
        match self.edge_index.get(&id) {
            Some(&idx) => self.edges.get(idx),
            None => self.awaiting.get(&id),
        }
    }

    #[inline]
    fn has_endpoints(&self, edge: &Edge) -> bool {
        self.vertex_index.contains_key(&edge.source) && self.vertex_index.contains_key(&edge.target)
    }

    fn place_edge(&mut self, edge: Edge) {
        if self.has_endpoints(&edge) {
            self.emit_edge(edge);
            return;
        }

        for endpoint in [edge.source, edge.target] {
            if self.vertex_index.contains_key(&endpoint) {
                continue;
            }
            let waiting = self.awaiting_by_vertex.entry(endpoint).or_default();
            if !waiting.contains(&edge.id) {
                waiting.push(edge.id);
            }
        }
        self.awaiting.insert(edge.id, edge);
    }

    fn emit_edge(&mut self, edge: Edge) {
        let id = edge.id;
        self.edge_index.insert(id, self.edges.len());
        self.edges.push(edge);
        self.ingested += 1;
        self.attach_edge_links(id);
    }

    fn promote_awaiting(&mut self, vertex: VertexId) {
        let Some(ids) = self.awaiting_by_vertex.remove(&vertex) else {
            return;
        };
        for id in ids {
            let ready = self
                .awaiting
                .get(&id)
                .map_or(false, |edge| self.has_endpoints(edge));
            if ready {
                if let Some(edge) = self.awaiting.remove(&id) {
                    self.emit_edge(edge);
                }
            }
        }
    }

    fn remove_fragment(&mut self, id: EdgeId) -> Option<IncompleteEdge> {
        let fragment = self.fragments.remove(&id)?;
        let key = (fragment.anchor, fragment.direction);
        if let Some(ids) = self.fragments_by_anchor.get_mut(&key) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.fragments_by_anchor.remove(&key);
            }
        }
        Some(fragment)
    }

    #[inline]
    fn link_expired(&self, queued_at: u64) -> bool {
        self.ingested.saturating_sub(queued_at) > self.config.max_link_retries
    }

    fn attach_vertex_links(&mut self, vertex: VertexId) {
        let Some(pending) = self.pending_vertex_links.remove(&vertex) else {
            return;
        };
        for p in pending {
            if self.link_expired(p.queued_at) {
                self.dropped_links += 1;
            } else {
                self.add_vertex_link(p.link);
            }
        }
    }

    fn attach_edge_links(&mut self, edge: EdgeId) {
        let Some(pending) = self.pending_edge_links.remove(&edge) else {
            return;
        };
        for p in pending {
            if self.link_expired(p.queued_at) {
                self.dropped_links += 1;
            } else {
                self.add_edge_link(p.link);
            }
        }
    }

    fn add_vertex_link(&mut self, link: ExplanationVertex) {
        if self.vertex_link_set.insert(link) {
            self.vertex_links.push(link);
        }
    }

    fn add_edge_link(&mut self, link: ExplanationEdge) {
        if self.edge_link_set.insert(link) {
            self.edge_links.push(link);
        }
    }

    fn pending_link_count(&self) -> usize {
        self.pending_vertex_links.values().map(Vec::len).sum::<usize>()
            + self.pending_edge_links.values().map(Vec::len).sum::<usize>()
    }

    fn evict_expired_links(&mut self) {
        let ingested = self.ingested;
        let max = self.config.max_link_retries;
        let mut evicted = 0;

        self.pending_vertex_links.retain(|_, links| {
            links.retain(|p| {
                let keep = ingested.saturating_sub(p.queued_at) <= max;
                if !keep {
                    evicted += 1;
                }
                keep
            });
            !links.is_empty()
        });
        self.pending_edge_links.retain(|_, links| {
            links.retain(|p| {
                let keep = ingested.saturating_sub(p.queued_at) <= max;
                if !keep {
                    evicted += 1;
                }
                keep
            });
            !links.is_empty()
        });

        if evicted > 0 {
            debug!("Evicted {} explanation links past their retry bound", evicted);
            self.dropped_links += evicted;
        }
    }
}

impl Default for GraphAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VertexEncoding;

    fn entity(id: VertexId, label: &str) -> Vertex {
        Vertex::new(id, VertexEncoding::Entity, label).with_size(80.0, 24.0)
    }

    #[test]
    fn test_self_loop_round_trip() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_vertex(entity(1, "person:1"));
        assembler.ingest_edge(Edge::new(10, 1, 1, "self")).unwrap();

        let graph = assembler.flush();
        assert_eq!(graph.vertex_ids(), vec![1]);
        assert_eq!(graph.edge_ids(), vec![10]);
    }

    #[test]
    fn test_fragment_resolves_when_complement_arrives() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_vertex(entity(2, "company"));
        assembler
            .ingest_incomplete_edge(IncompleteEdge::new(5, 2, EdgeDirection::Outgoing, "owns"))
            .unwrap();
        assert!(assembler.flush().edges.is_empty());
        assert_eq!(assembler.diagnostics().pending_edges, 1);

        assembler.ingest_vertex(entity(3, "asset"));
        assembler
            .ingest_incomplete_edge(IncompleteEdge::new(5, 3, EdgeDirection::Incoming, "owns"))
            .unwrap();

        let graph = assembler.flush();
        assert_eq!(graph.edges, vec![Edge::new(5, 2, 3, "owns")]);
        assert_eq!(assembler.diagnostics().pending_edges, 0);
    }

    #[test]
    fn test_complete_fragments_by_anchor() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_vertex(entity(1, "a"));
        assembler.ingest_vertex(entity(2, "b"));
        assembler
            .ingest_incomplete_edge(IncompleteEdge::new(7, 1, EdgeDirection::Incoming, "role"))
            .unwrap();
        assembler
            .ingest_incomplete_edge(IncompleteEdge::new(8, 1, EdgeDirection::Incoming, "role"))
            .unwrap();

        assert_eq!(assembler.complete_fragments(1, EdgeDirection::Outgoing, 2), 0);
        assert_eq!(assembler.complete_fragments(1, EdgeDirection::Incoming, 2), 2);

        let graph = assembler.flush();
        assert_eq!(graph.edge_ids(), vec![7, 8]);
        assert!(graph.edges.iter().all(|e| e.source == 2 && e.target == 1));
    }

    #[test]
    fn test_edge_waits_for_endpoints() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_edge(Edge::new(10, 1, 2, "knows")).unwrap();
        assembler.ingest_vertex(entity(1, "a"));
        assert!(assembler.flush().edges.is_empty());

        assembler.ingest_vertex(entity(2, "b"));
        assert_eq!(assembler.flush().edge_ids(), vec![10]);
    }

    #[test]
    fn test_duplicate_vertex_keeps_first() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_vertex(entity(1, "first"));
        assembler.ingest_vertex(entity(1, "second"));

        let graph = assembler.flush();
        assert_eq!(graph.vertices.len(), 1);
        assert_eq!(graph.vertices[0].label, "first");
        assert_eq!(assembler.diagnostics().duplicate_vertices, 1);
    }

    #[test]
    fn test_conflicting_edge_rejected_without_damage() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_vertex(entity(1, "a"));
        assembler.ingest_vertex(entity(2, "b"));
        assembler.ingest_edge(Edge::new(10, 1, 2, "knows")).unwrap();

        let before = assembler.flush();
        let err = assembler.ingest_edge(Edge::new(10, 2, 1, "knows")).unwrap_err();
        assert_eq!(err.code(), "CONFLICTING_ELEMENT");
        assert!(matches!(err, Error::ConflictingElement { id: 10, .. }));
        assert!(err.to_string().starts_with("Conflicting edge 10:"));
        assert_eq!(assembler.flush(), before);

        // Same endpoints again is just a repeat
        assembler.ingest_edge(Edge::new(10, 1, 2, "knows")).unwrap();
        assert_eq!(assembler.diagnostics().duplicate_edges, 1);
    }

    #[test]
    fn test_conflicting_fragments_rejected() {
        let mut assembler = GraphAssembler::new();
        assembler
            .ingest_incomplete_edge(IncompleteEdge::new(5, 2, EdgeDirection::Outgoing, "owns"))
            .unwrap();
        assert!(assembler
            .ingest_incomplete_edge(IncompleteEdge::new(5, 9, EdgeDirection::Outgoing, "owns"))
            .is_err());
        assert!(assembler.ingest_edge(Edge::new(5, 3, 4, "owns")).is_err());

        // The first fragment is still pending and can still resolve
        assembler.ingest_vertex(entity(2, "a"));
        assembler.ingest_vertex(entity(4, "b"));
        assembler.ingest_edge(Edge::new(5, 2, 4, "owns")).unwrap();
        assert_eq!(assembler.flush().edges, vec![Edge::new(5, 2, 4, "owns")]);
        assert_eq!(assembler.diagnostics().pending_edges, 0);
    }

    #[test]
    fn test_explanation_links_retry_until_referent_exists() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_explanation_vertex(ExplanationVertex { explanation_id: 1, vertex_id: 3 });
        assembler.ingest_explanation_edge(ExplanationEdge { explanation_id: 1, edge_id: 10 });
        assert_eq!(assembler.diagnostics().pending_links, 2);

        assembler.ingest_vertex(entity(3, "c"));
        assembler.ingest_edge(Edge::new(10, 3, 3, "loop")).unwrap();

        let graph = assembler.flush();
        assert_eq!(
            graph.explanation_vertices,
            vec![ExplanationVertex { explanation_id: 1, vertex_id: 3 }]
        );
        assert_eq!(graph.explanation_edges, vec![ExplanationEdge { explanation_id: 1, edge_id: 10 }]);
        assert_eq!(assembler.diagnostics().pending_links, 0);
    }

    #[test]
    fn test_unresolved_elements_dropped_at_finish() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_vertex(entity(1, "a"));
        assembler
            .ingest_incomplete_edge(IncompleteEdge::new(5, 1, EdgeDirection::Outgoing, "owns"))
            .unwrap();
        assembler.ingest_edge(Edge::new(6, 1, 99, "knows")).unwrap();
        assembler.ingest_explanation_vertex(ExplanationVertex { explanation_id: 2, vertex_id: 42 });

        let graph = assembler.finish();
        assert_eq!(graph.vertex_ids(), vec![1]);
        assert!(graph.edges.is_empty());
        assert!(graph.explanation_vertices.is_empty());

        let diagnostics = assembler.diagnostics();
        assert_eq!(diagnostics.dropped_edges, 2);
        assert_eq!(diagnostics.dropped_links, 1);
        assert_eq!(diagnostics.pending_edges, 0);
        assert_eq!(diagnostics.pending_links, 0);
    }

    #[test]
    fn test_link_retry_bound() {
        let mut assembler = GraphAssembler::with_config(AssemblerConfig { max_link_retries: 2 });
        assembler.ingest_explanation_vertex(ExplanationVertex { explanation_id: 1, vertex_id: 50 });
        for id in 0..3 {
            assembler.ingest_vertex(entity(id, "filler"));
        }

        let graph = assembler.flush();
        assert!(graph.explanation_vertices.is_empty());
        assert_eq!(assembler.diagnostics().dropped_links, 1);

        // A late referent no longer revives the link
        assembler.ingest_vertex(entity(50, "late"));
        assert!(assembler.flush().explanation_vertices.is_empty());
    }

    #[test]
    fn test_flush_order_is_stable() {
        let mut assembler = GraphAssembler::new();
        assembler.ingest_vertex(entity(3, "c"));
        assembler.ingest_vertex(entity(1, "a"));
        assembler.ingest_edge(Edge::new(20, 1, 2, "late")).unwrap();
        assembler.ingest_edge(Edge::new(21, 3, 1, "early")).unwrap();
        let first = assembler.flush();
        assert_eq!(first.vertex_ids(), vec![3, 1]);
        assert_eq!(first.edge_ids(), vec![21]);

        assembler.ingest_vertex(entity(2, "b"));
        let second = assembler.flush();
        assert_eq!(second.vertex_ids(), vec![3, 1, 2]);
        assert_eq!(second.edge_ids(), vec![21, 20]);
        assert_eq!(&second.vertices[..2], &first.vertices[..]);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut assembler = GraphAssembler::with_config(AssemblerConfig { max_link_retries: 7 });
        assembler.ingest_vertex(entity(1, "a"));
        assembler
            .ingest_incomplete_edge(IncompleteEdge::new(5, 1, EdgeDirection::Outgoing, "owns"))
            .unwrap();
        assembler.reset();

        assert!(assembler.flush().is_empty());
        assert_eq!(assembler.diagnostics(), AssemblyDiagnostics::default());
        assert_eq!(assembler.config().max_link_retries, 7);
    }

    #[test]
    fn test_ingest_all_collects_conflicts() {
        let mut assembler = GraphAssembler::new();
        let rejected = assembler.ingest_all(vec![
            GraphEvent::VertexSeen(entity(1, "a")),
            GraphEvent::EdgeSeen(Edge::new(10, 1, 1, "self")),
            GraphEvent::EdgeSeen(Edge::new(10, 1, 2, "self")),
            GraphEvent::FragmentsCompleted {
                anchor: 1,
                direction: EdgeDirection::Outgoing,
                vertex: 1,
            },
        ]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(assembler.edge_count(), 1);
        assert_eq!(assembler.vertex_count(), 1);
    }
}
