//! # graphdesk Session
//!
//! Connection lifecycle for the graphdesk client: editing the login
//! profile, opening and releasing database clients, refreshing the
//! database catalog in the background and producing a validated
//! [`Submission`] for the workspace.
//!
//! The wire protocol lives behind [`DatabaseClient`] and [`ClientFactory`];
//! failures surface through an [`ErrorReporter`].

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod manager;
pub mod reporter;

pub use catalog::{CatalogState, DatabaseCatalog};
pub use client::{ClientFactory, ClientHandle, DatabaseClient, DB};
pub use config::{Clock, ManualClock, SessionConfig, SystemClock, DEFAULT_REFRESH_DEBOUNCE_MS};
pub use error::{ClientError, ErrorKind, Result, SessionError};
pub use manager::{ConnectionSessionManager, Submission};
pub use reporter::{ErrorReporter, QueuedReporter, Report, TracingReporter};
