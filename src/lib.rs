//! # graphdesk
//!
//! Core of a desktop client for a graph database.
//!
//! graphdesk connects to a server, lets the user pick a database, and
//! turns the element stream of a query into a consistent graph snapshot
//! for a renderer to draw.
//!
//! ## Quick Start
//!
//! ### Replaying a recorded query stream
//!
//! ```bash
//! graphdesk replay events.jsonl --flush-every 100
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use graphdesk::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(factory: Arc<dyn ClientFactory>) {
//! let manager = ConnectionSessionManager::new(
//!     tokio::runtime::Handle::current(),
//!     factory,
//!     Arc::new(TracingReporter),
//! )
//! .with_profile(ServerProfile::core("localhost:1729"));
//!
//! if let Some(fetch) = manager.request_catalog_refresh() {
//!     fetch.await.ok();
//! }
//! manager.select_database("social");
//! let submission = manager.submit();
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `graphdesk-core` - Profiles, graph data model, the incremental [`GraphAssembler`]
//! - `graphdesk-session` - Client lifecycle, catalog refresh, [`ConnectionSessionManager`]

pub mod replay;

// Re-export core types
pub use graphdesk_core::{
    AssemblerConfig, AssemblyDiagnostics, ConnectTarget, Edge, EdgeDirection, Error,
    ExplanationEdge, ExplanationVertex, GraphAssembler, GraphData, GraphEvent, IncompleteEdge,
    Result, ServerKind, ServerProfile, Vertex, VertexEncoding,
};

// Re-export session layer
pub use graphdesk_session::{
    CatalogState, ClientError, ClientFactory, ClientHandle, ConnectionSessionManager,
    DatabaseCatalog, DatabaseClient, ErrorKind, ErrorReporter, QueuedReporter, SessionConfig,
    SessionError, Submission, TracingReporter, DB,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AssemblerConfig, CatalogState, ClientFactory, ConnectionSessionManager, DatabaseClient,
        Edge, EdgeDirection, ErrorReporter, GraphAssembler, GraphData, GraphEvent,
        IncompleteEdge, ServerKind, ServerProfile, Submission, TracingReporter, Vertex,
        VertexEncoding, DB,
    };
}
