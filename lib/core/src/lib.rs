//! # graphdesk Core
//!
//! Core library for the graphdesk graph database client.
//!
//! This crate provides the data model and the graph-building algorithm:
//!
//! - [`ServerProfile`] - Where and how to connect (core or cluster server)
//! - [`Vertex`], [`Edge`], [`IncompleteEdge`] - Elements of a query result
//! - [`GraphEvent`] - Tagged records streamed while a query materializes
//! - [`GraphAssembler`] - Folds the event stream into [`GraphData`] snapshots
//!
//! ## Example
//!
//! ```rust
//! use graphdesk_core::{Edge, GraphAssembler, Vertex, VertexEncoding};
//!
//! let mut assembler = GraphAssembler::new();
//! assembler.ingest_edge(Edge::new(10, 1, 1, "self")).unwrap();
//! assembler.ingest_vertex(Vertex::new(1, VertexEncoding::Entity, "person:1"));
//!
//! let graph = assembler.flush();
//! assert_eq!(graph.vertex_ids(), vec![1]);
//! assert_eq!(graph.edge_ids(), vec![10]);
//! ```

pub mod assembler;
pub mod error;
pub mod graph;
pub mod profile;

pub use assembler::{AssemblerConfig, AssemblyDiagnostics, GraphAssembler};
pub use error::{Error, Result};
pub use graph::{
    Edge, EdgeDirection, EdgeId, ExplanationEdge, ExplanationId, ExplanationVertex,
    GraphData, GraphEvent, IncompleteEdge, Vertex, VertexEncoding, VertexId,
};
pub use profile::{ConnectTarget, ServerKind, ServerProfile};
