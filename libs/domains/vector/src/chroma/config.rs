pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8001";
pub const DEFAULT_TENANT: &str = "default_tenant";
pub const DEFAULT_DATABASE: &str = "default_database";

/// Chroma connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromaConfig {
    pub url: String,
    pub tenant: String,
    pub database: String,
}

impl ChromaConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tenant: DEFAULT_TENANT.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHROMA_URL)
    }
}
