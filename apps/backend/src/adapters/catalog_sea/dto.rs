//! DTOs for catalog_sea adapter.

#[derive(Debug, Clone)]
pub struct CatalogCreate {
    pub session_id: Option<String>,
    pub name: String,
    pub description: String,
    pub rule_key: String,
    pub stat_schema: String,
}

impl CatalogCreate {
    pub fn new(name: impl Into<String>, rule_key: impl Into<String>) -> Self {
        Self {
            session_id: None,
            name: name.into(),
            description: String::new(),
            rule_key: rule_key.into(),
            stat_schema: "[]".to_string(),
        }
    }

    pub fn in_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_stat_schema(mut self, encoded: impl Into<String>) -> Self {
        self.stat_schema = encoded.into();
        self
    }
}
