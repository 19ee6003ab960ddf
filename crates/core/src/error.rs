use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The mission catalog contains a prerequisite chain that loops back on
    /// itself. Missions on the cycle can never become active.
    #[error("Prerequisite cycle between missions {mission_ids:?}")]
    PrerequisiteCycle { mission_ids: Vec<DbId> },

    #[error("Internal error: {0}")]
    Internal(String),
}
