// Database client capability and the handles the session hands out
use crate::ClientError;
use async_trait::async_trait;
use graphdesk_core::ConnectTarget;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Connection to a graph database server.
///
/// Implemented by the wire-protocol client; the session layer only needs
/// to list databases and to release the connection.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// List the databases on the server, in server order
    async fn list_databases(&self) -> Result<Vec<String>, ClientError>;

    /// Release the underlying connection
    fn close(&self);
}

/// Opens clients for a connect target.
///
/// Core targets carry only an address; cluster targets also carry
/// credentials and an optional root certificate.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn DatabaseClient>, ClientError>;
}

/// Owns one client and guarantees it is closed exactly once
pub struct ClientHandle {
    client: Box<dyn DatabaseClient>,
    address: String,
    closed: AtomicBool,
}

impl ClientHandle {
    pub fn new(client: Box<dyn DatabaseClient>, address: impl Into<String>) -> Self {
        Self {
            client,
            address: address.into(),
            closed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub async fn list_databases(&self) -> Result<Vec<String>, ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        self.client.list_databases().await
    }

    /// Close the client. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        debug!("Closing client for {}", self.address);
        self.client.close();
        true
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("address", &self.address)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A client paired with the database the user picked
#[derive(Clone)]
pub struct DB {
    client: Arc<ClientHandle>,
    database: String,
}

impl DB {
    pub fn new(client: Arc<ClientHandle>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    #[inline]
    pub fn client(&self) -> &Arc<ClientHandle> {
        &self.client
    }

    #[inline]
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl fmt::Debug for DB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DB")
            .field("address", &self.client.address())
            .field("database", &self.database)
            .finish()
    }
}
