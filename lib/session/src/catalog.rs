// Database catalog - the cached list of databases on the targeted server
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CatalogState {
    #[default]
    Empty,
    Loading,
    Loaded,
    Failed,
}

/// Database names fetched from one server address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseCatalog {
    source_address: String,
    names: Vec<String>,
    fetched_at_millis: Option<u64>,
    state: CatalogState,
}

impl DatabaseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> CatalogState {
        self.state
    }

    #[inline]
    pub fn source_address(&self) -> &str {
        &self.source_address
    }

    /// Names in server order, without duplicates
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub fn fetched_at_millis(&self) -> Option<u64> {
        self.fetched_at_millis
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub(crate) fn begin_loading(&mut self, address: &str) {
        self.source_address = address.to_string();
        self.names.clear();
        self.state = CatalogState::Loading;
    }

    pub(crate) fn load(&mut self, address: &str, names: Vec<String>, fetched_at_millis: u64) {
        self.source_address = address.to_string();
        self.names.clear();
        for name in names {
            if !self.contains(&name) {
                self.names.push(name);
            }
        }
        self.fetched_at_millis = Some(fetched_at_millis);
        self.state = CatalogState::Loaded;
    }

    pub(crate) fn fail(&mut self) {
        self.names.clear();
        self.state = CatalogState::Failed;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Text for the database dropdown
    pub fn hint(&self, selected: Option<&str>, loading: bool) -> String {
        if let Some(name) = selected {
            return name.to_string();
        }
        if loading {
            return "Loading databases...".to_string();
        }
        match self.state {
            CatalogState::Loaded if self.names.is_empty() => "This server has no databases".to_string(),
            CatalogState::Failed => "Failed to load databases".to_string(),
            CatalogState::Loading => "Loading databases...".to_string(),
            CatalogState::Empty | CatalogState::Loaded => "Select a database".to_string(),
        }
    }
}
