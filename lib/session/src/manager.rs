//! Connection session lifecycle
//!
//! The [`ConnectionSessionManager`] owns the editable login profile, the
//! client connected to it and the database catalog fetched through that
//! client. Catalog fetches run on the Tokio runtime; their results are
//! applied only if the profile they were started for is still current.
//! A stale result is discarded and its freshly opened client closed.

use crate::catalog::{CatalogState, DatabaseCatalog};
use crate::client::{ClientFactory, ClientHandle, DB};
use crate::config::{Clock, SessionConfig, SystemClock};
use crate::error::{ClientError, SessionError};
use crate::reporter::ErrorReporter;
use graphdesk_core::{ConnectTarget, ServerKind, ServerProfile};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Validated login result, handed to whatever opens the workspace
#[derive(Debug, Clone)]
pub struct Submission {
    pub profile: ServerProfile,
    pub db: DB,
}

#[derive(Debug, Default)]
struct FetchState {
    in_flight: bool,
    // Bumped whenever the target or its credentials change, or the session closes
    generation: u64,
    last_address: Option<String>,
    last_at_millis: Option<u64>,
}

impl FetchState {
    fn forget_last(&mut self) {
        self.last_address = None;
        self.last_at_millis = None;
    }
}

#[derive(Debug, Default)]
struct SessionState {
    profile: ServerProfile,
    client: Option<Arc<ClientHandle>>,
    catalog: DatabaseCatalog,
    selected_database: Option<String>,
    db: Option<DB>,
    fetch: FetchState,
}

impl SessionState {
    fn close_client(&mut self) {
        self.db = None;
        if let Some(client) = self.client.take() {
            client.close();
        }
    }

    /// The server target changed: nothing cached so far applies any more.
    /// A fetch already in flight keeps the slot until it completes.
    fn invalidate(&mut self) {
        self.close_client();
        self.catalog.clear();
        self.selected_database = None;
        self.fetch.generation += 1;
        self.fetch.forget_last();
    }

    /// Credentials changed: a cluster fetch started with the old ones must not land
    fn credentials_changed(&mut self) {
        if self.profile.kind == ServerKind::Cluster {
            self.fetch.generation += 1;
        }
        self.fetch.forget_last();
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.fetch.generation == ticket.generation
            && self.profile.kind == ticket.kind
            && self.profile.address == ticket.address
    }
}

/// What a fetch was started for, compared against live state on completion
#[derive(Debug, Clone)]
struct FetchTicket {
    generation: u64,
    kind: ServerKind,
    address: String,
}

enum FetchFailure {
    Client(ClientError),
    Internal(anyhow::Error),
}

type FetchOutcome = std::result::Result<(Arc<ClientHandle>, Vec<String>), FetchFailure>;

/// Single owner of login state, the open client and the database catalog
pub struct ConnectionSessionManager {
    state: Arc<Mutex<SessionState>>,
    factory: Arc<dyn ClientFactory>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    config: SessionConfig,
}

impl ConnectionSessionManager {
    pub fn new(
        runtime: Handle,
        factory: Arc<dyn ClientFactory>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            factory,
            reporter,
            clock: Arc::new(SystemClock),
            runtime,
            config: SessionConfig::default(),
        }
    }

    /// Start from a previously used profile
    #[must_use]
    pub fn with_profile(self, profile: ServerProfile) -> Self {
        self.state.lock().profile = profile;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ==================== Form editing ====================

    pub fn select_server_kind(&self, kind: ServerKind) {
        let mut state = self.state.lock();
        if state.profile.kind == kind {
            return;
        }
        info!("Server kind changed to {}", kind.display_name());
        state.profile.kind = kind;
        state.invalidate();
    }

    pub fn set_address(&self, address: impl Into<String>) {
        let address = address.into();
        let mut state = self.state.lock();
        if state.profile.address == address {
            return;
        }
        debug!("Server address changed to {}", address);
        state.profile.address = address;
        state.invalidate();
    }

    pub fn set_username(&self, username: impl Into<String>) {
        let username = username.into();
        let mut state = self.state.lock();
        if state.profile.username.as_deref() == Some(username.as_str()) {
            return;
        }
        state.profile.username = Some(username);
        state.credentials_changed();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        let mut state = self.state.lock();
        if state.profile.password.as_deref() == Some(password.as_str()) {
            return;
        }
        state.profile.password = Some(password);
        state.credentials_changed();
    }

    pub fn set_root_cert_path(&self, path: Option<PathBuf>) {
        let mut state = self.state.lock();
        if state.profile.root_cert_path == path {
            return;
        }
        state.profile.root_cert_path = path;
        state.credentials_changed();
    }

    // ==================== Catalog ====================

    /// Fetch the database list for the current profile in the background.
    ///
    /// Returns `None` without doing anything when a fetch is already in
    /// flight, when the same address was fetched successfully within the
    /// debounce window, or when the profile cannot be connected to yet.
    pub fn request_catalog_refresh(&self) -> Option<JoinHandle<()>> {
        let (ticket, target) = {
            let mut state = self.state.lock();
            if state.fetch.in_flight {
                debug!("Catalog fetch already in flight");
                return None;
            }

            let now = self.clock.now_millis();
            if state.fetch.last_address.as_deref() == Some(state.profile.address.as_str()) {
                if let Some(at) = state.fetch.last_at_millis {
                    if now.saturating_sub(at) < self.config.refresh_debounce_ms {
                        debug!("Catalog for {} is fresh, skipping refresh", state.profile.address);
                        return None;
                    }
                }
            }

            let target = match state.profile.connect_target() {
                Ok(target) => target,
                Err(e) => {
                    debug!("Not refreshing catalog: {}", e);
                    return None;
                }
            };

            state.fetch.in_flight = true;
            state.close_client();
            let address = state.profile.address.clone();
            state.catalog.begin_loading(&address);

            let ticket = FetchTicket {
                generation: state.fetch.generation,
                kind: state.profile.kind,
                address,
            };
            (ticket, target)
        };

        info!("Loading databases from {}", ticket.address);
        let state = self.state.clone();
        let factory = self.factory.clone();
        let reporter = self.reporter.clone();
        let clock = self.clock.clone();

        Some(self.runtime.spawn(async move {
            // Run the fetch as its own task so a panicking client surfaces
            // as a join error instead of leaving the fetch marked in flight
            let outcome = match tokio::spawn(fetch_databases(factory, target)).await {
                Ok(result) => result.map_err(FetchFailure::Client),
                Err(e) => Err(FetchFailure::Internal(anyhow::anyhow!(
                    "catalog fetch task failed: {}",
                    e
                ))),
            };
            complete_fetch(&state, ticket, outcome, clock.now_millis(), reporter.as_ref());
        }))
    }

    // ==================== Selection & submission ====================

    /// Pick a database on the open client.
    ///
    /// Without a client (the fetch is still pending or has failed) the
    /// selection is cleared instead.
    pub fn select_database(&self, name: impl Into<String>) -> Option<DB> {
        let name = name.into();
        let mut state = self.state.lock();
        match state.client.clone() {
            Some(client) => {
                let db = DB::new(client, name.clone());
                state.selected_database = Some(name);
                state.db = Some(db.clone());
                Some(db)
            }
            None => {
                warn!("Database '{}' selected without an open client", name);
                state.selected_database = None;
                state.db = None;
                None
            }
        }
    }

    /// Validate the form and hand the client over to a [`Submission`].
    ///
    /// On success the session no longer owns the client; it is released
    /// when the last handle to the submitted [`DB`] goes away. Validation
    /// failures go to the reporter's internal channel.
    pub fn submit(&self) -> Option<Submission> {
        let result = {
            let mut state = self.state.lock();
            Self::build_submission(&mut state)
        };
        match result {
            Ok(submission) => {
                info!(
                    "Opening database '{}' at {}",
                    submission.db.database(),
                    submission.profile.address
                );
                Some(submission)
            }
            Err(e) => {
                self.reporter.report_internal_error(&e);
                None
            }
        }
    }

    fn build_submission(state: &mut SessionState) -> crate::Result<Submission> {
        state.profile.validate()?;
        let db = state
            .db
            .clone()
            .filter(|db| !db.client().is_closed())
            .ok_or(graphdesk_core::Error::NoDatabaseSelected)?;

        let submission = Submission {
            profile: state.profile.clone(),
            db,
        };
        state.client = None;
        state.db = None;
        Ok(submission)
    }

    /// Release the held client. Safe to call any number of times.
    pub fn close(&self) {
        let client = {
            let mut state = self.state.lock();
            state.fetch.generation += 1;
            if state.catalog.state() == CatalogState::Loading {
                state.catalog.clear();
            }
            state.db = None;
            state.client.take()
        };
        if let Some(client) = client {
            if client.close() {
                info!("Closed connection to {}", client.address());
            }
        }
    }

    // ==================== Accessors ====================

    pub fn profile(&self) -> ServerProfile {
        self.state.lock().profile.clone()
    }

    pub fn catalog(&self) -> DatabaseCatalog {
        self.state.lock().catalog.clone()
    }

    pub fn catalog_state(&self) -> CatalogState {
        self.state.lock().catalog.state()
    }

    pub fn selected_database(&self) -> Option<String> {
        self.state.lock().selected_database.clone()
    }

    pub fn current_db(&self) -> Option<DB> {
        self.state.lock().db.clone()
    }

    pub fn has_client(&self) -> bool {
        self.state.lock().client.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().fetch.in_flight
    }

    /// Text for the database dropdown
    pub fn field_hint(&self) -> String {
        let state = self.state.lock();
        state
            .catalog
            .hint(state.selected_database.as_deref(), state.fetch.in_flight)
    }
}

impl Drop for ConnectionSessionManager {
    fn drop(&mut self) {
        self.close();
    }
}

async fn fetch_databases(
    factory: Arc<dyn ClientFactory>,
    target: ConnectTarget,
) -> std::result::Result<(Arc<ClientHandle>, Vec<String>), ClientError> {
    let client = factory.connect(&target).await?;
    let handle = Arc::new(ClientHandle::new(client, target.address()));
    match handle.list_databases().await {
        Ok(names) => Ok((handle, names)),
        Err(e) => {
            handle.close();
            Err(e)
        }
    }
}

fn complete_fetch(
    state: &Mutex<SessionState>,
    ticket: FetchTicket,
    outcome: FetchOutcome,
    now_millis: u64,
    reporter: &dyn ErrorReporter,
) {
    let mut state = state.lock();
    // Only one fetch runs at a time, so whatever finishes frees the slot
    state.fetch.in_flight = false;
    if !state.is_current(&ticket) {
        debug!("Discarding stale catalog fetch for {}", ticket.address);
        if state.catalog.state() == CatalogState::Loading {
            state.catalog.clear();
        }
        if let Ok((client, _)) = outcome {
            client.close();
        }
        return;
    }

    match outcome {
        Ok((client, names)) => {
            info!("Loaded {} databases from {}", names.len(), ticket.address);
            state.catalog.load(&ticket.address, names, now_millis);
            state.fetch.last_address = Some(ticket.address);
            state.fetch.last_at_millis = Some(now_millis);

            if let Some(name) = state.selected_database.clone() {
                if state.catalog.contains(&name) {
                    state.db = Some(DB::new(client.clone(), name));
                } else {
                    state.selected_database = None;
                }
            }
            if let Some(previous) = state.client.replace(client) {
                previous.close();
            }
        }
        Err(failure) => {
            state.catalog.fail();
            state.fetch.forget_last();
            drop(state);

            let address = ticket.address;
            match failure {
                FetchFailure::Client(e) if e.is_transport() => {
                    reporter.report_transport_error(&e, &|| {
                        format!("Failed to load databases at address {}", address)
                    });
                }
                FetchFailure::Client(e) => {
                    reporter.report_internal_error(&SessionError::Transport(e));
                }
                FetchFailure::Internal(e) => {
                    reporter.report_internal_error(&SessionError::Internal(e));
                }
            }
        }
    }
}
