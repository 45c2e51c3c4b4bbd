//! DTOs for titles_sea adapter.

#[derive(Debug, Clone, PartialEq)]
pub struct TitleCreate {
    pub session_id: String,
    pub drafted_game_id: Option<String>,
    pub participant_id: String,
    pub name: String,
    pub description: String,
    pub is_humorous: bool,
    pub points: f64,
}
