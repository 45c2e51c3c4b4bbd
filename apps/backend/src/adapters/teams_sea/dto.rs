//! DTOs for teams_sea adapter.

#[derive(Debug, Clone)]
pub struct TeamCreate {
    pub session_id: String,
    pub name: String,
}

impl TeamCreate {
    pub fn new(session_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            name: name.into(),
        }
    }
}
