// Server profiles - where and how the client connects
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of server a profile targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerKind {
    #[default]
    Core,
    Cluster,
}

impl ServerKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ServerKind::Core => "Core",
            ServerKind::Cluster => "Cluster",
        }
    }
}

/// Description of a backend the user wants to connect to.
///
/// Fields stay editable while the login form is open; once submitted
/// the profile is cloned and never changed again.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    pub kind: ServerKind,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_cert_path: Option<PathBuf>,
}

/// What a client factory needs to open a connection for a given kind
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    Core {
        address: String,
    },
    Cluster {
        address: String,
        username: String,
        password: String,
        root_cert_path: Option<PathBuf>,
    },
}

impl ConnectTarget {
    pub fn address(&self) -> &str {
        match self {
            ConnectTarget::Core { address } | ConnectTarget::Cluster { address, .. } => address,
        }
    }

    pub fn kind(&self) -> ServerKind {
        match self {
            ConnectTarget::Core { .. } => ServerKind::Core,
            ConnectTarget::Cluster { .. } => ServerKind::Cluster,
        }
    }
}

impl fmt::Debug for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectTarget::Core { address } => f.debug_struct("Core").field("address", address).finish(),
            ConnectTarget::Cluster { address, username, root_cert_path, .. } => f
                .debug_struct("Cluster")
                .field("address", address)
                .field("username", username)
                .field("password", &"<redacted>")
                .field("root_cert_path", root_cert_path)
                .finish(),
        }
    }
}

impl ServerProfile {
    #[inline]
    #[must_use]
    pub fn core(address: impl Into<String>) -> Self {
        Self {
            kind: ServerKind::Core,
            address: address.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cluster(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            kind: ServerKind::Cluster,
            address: address.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            root_cert_path: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_root_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_cert_path = Some(path.into());
        self
    }

    /// Check that every field the kind requires is present and non-blank
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::InvalidProfile("server address is blank".to_string()));
        }
        if self.kind == ServerKind::Cluster {
            if is_blank(&self.username) {
                return Err(Error::InvalidProfile("username is blank".to_string()));
            }
            if is_blank(&self.password) {
                return Err(Error::InvalidProfile("password is blank".to_string()));
            }
        }
        Ok(())
    }

    /// Build the connection parameters for this profile's kind.
    ///
    /// Core servers only need an address; cluster servers also need
    /// credentials and optionally a root CA certificate.
    pub fn connect_target(&self) -> Result<ConnectTarget> {
        self.validate()?;
        Ok(match self.kind {
            ServerKind::Core => ConnectTarget::Core {
                address: self.address.clone(),
            },
            ServerKind::Cluster => ConnectTarget::Cluster {
                address: self.address.clone(),
                username: self.username.clone().unwrap_or_default(),
                password: self.password.clone().unwrap_or_default(),
                root_cert_path: self.root_cert_path.clone(),
            },
        })
    }

    /// Load a profile from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)
            .map_err(|e| Error::InvalidProfile(format!("{}: {}", path.display(), e)))?;
        serde_json::from_slice(&raw)
            .map_err(|e| Error::InvalidProfile(format!("{}: {}", path.display(), e)))
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |s| s.trim().is_empty())
}

impl fmt::Debug for ServerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerProfile")
            .field("kind", &self.kind)
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("root_cert_path", &self.root_cert_path)
            .finish()
    }
}
