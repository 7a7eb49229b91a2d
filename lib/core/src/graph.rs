// Graph data model - vertices, edges and explanation overlays produced by a query
use serde::{Deserialize, Serialize};

pub type VertexId = i32;
pub type EdgeId = i32;
pub type ExplanationId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VertexEncoding {
    EntityType,
    RelationType,
    AttributeType,
    ThingType,
    Entity,
    Relation,
    Attribute,
}

impl VertexEncoding {
    /// True for schema-level encodings (types), false for data instances
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            VertexEncoding::EntityType
                | VertexEncoding::RelationType
                | VertexEncoding::AttributeType
                | VertexEncoding::ThingType
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub encoding: VertexEncoding,
    pub label: String,
    pub short_label: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub inferred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: VertexId,
    pub target: VertexId,
    pub label: String,
    #[serde(default)]
    pub inferred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeDirection {
    /// The anchored vertex is the edge's source
    Outgoing,
    /// The anchored vertex is the edge's target
    Incoming,
}

/// One side of an edge whose far endpoint has not been reported yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteEdge {
    pub id: EdgeId,
    #[serde(rename = "vertex_id")]
    pub anchor: VertexId,
    pub direction: EdgeDirection,
    pub label: String,
    #[serde(default)]
    pub inferred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExplanationVertex {
    pub explanation_id: ExplanationId,
    pub vertex_id: VertexId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExplanationEdge {
    pub explanation_id: ExplanationId,
    pub edge_id: EdgeId,
}

/// Point-in-time view of an assembled query result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub explanation_vertices: Vec<ExplanationVertex>,
    pub explanation_edges: Vec<ExplanationEdge>,
}

/// A single record in the stream a query produces while materializing its answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GraphEvent {
    VertexSeen(Vertex),
    EdgeSeen(Edge),
    IncompleteEdgeSeen(IncompleteEdge),
    /// Every fragment anchored at `anchor` in `direction` ends at `vertex`
    FragmentsCompleted {
        anchor: VertexId,
        direction: EdgeDirection,
        vertex: VertexId,
    },
    ExplanationVertexSeen(ExplanationVertex),
    ExplanationEdgeSeen(ExplanationEdge),
}

impl Vertex {
    #[inline]
    #[must_use]
    pub fn new(id: VertexId, encoding: VertexEncoding, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id,
            encoding,
            short_label: label.clone(),
            label,
            width: 0.0,
            height: 0.0,
            inferred: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_short_label(mut self, short_label: impl Into<String>) -> Self {
        self.short_label = short_label.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[inline]
    #[must_use]
    pub fn inferred(mut self) -> Self {
        self.inferred = true;
        self
    }
}

impl Edge {
    #[inline]
    #[must_use]
    pub fn new(id: EdgeId, source: VertexId, target: VertexId, label: impl Into<String>) -> Self {
        Self {
            id,
            source,
            target,
            label: label.into(),
            inferred: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn inferred(mut self) -> Self {
        self.inferred = true;
        self
    }

    /// The endpoint an incomplete fragment in `direction` would be anchored at
    #[inline]
    pub fn endpoint(&self, direction: EdgeDirection) -> VertexId {
        match direction {
            EdgeDirection::Outgoing => self.source,
            EdgeDirection::Incoming => self.target,
        }
    }
}

impl IncompleteEdge {
    #[inline]
    #[must_use]
    pub fn new(
        id: EdgeId,
        anchor: VertexId,
        direction: EdgeDirection,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            anchor,
            direction,
            label: label.into(),
            inferred: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn inferred(mut self) -> Self {
        self.inferred = true;
        self
    }

    /// Promote this fragment to a full edge ending at `far`
    pub fn complete(self, far: VertexId) -> Edge {
        let (source, target) = match self.direction {
            EdgeDirection::Outgoing => (self.anchor, far),
            EdgeDirection::Incoming => (far, self.anchor),
        };
        Edge {
            id: self.id,
            source,
            target,
            label: self.label,
            inferred: self.inferred,
        }
    }
}

impl GraphData {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.iter().map(|v| v.id).collect()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.iter().map(|e| e.id).collect()
    }

    /// Explanations touching the given vertex
    pub fn explanations_for_vertex(&self, id: VertexId) -> Vec<ExplanationId> {
        self.explanation_vertices
            .iter()
            .filter(|l| l.vertex_id == id)
            .map(|l| l.explanation_id)
            .collect()
    }
}
