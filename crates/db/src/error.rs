use dexquest_core::types::DbId;

/// Errors returned by [`DataStore`](crate::DataStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The mission's reward has already been granted.
    #[error("Mission {0} reward was already claimed")]
    AlreadyClaimed(DbId),

    /// The mission is locked or its counter has not reached the requirement.
    #[error("Mission {0} is not eligible to be claimed")]
    NotEligible(DbId),

    #[error("Not enough gold: {required} required, {available} available")]
    InsufficientGold { required: i64, available: i64 },

    #[error("Item {0} is already owned")]
    AlreadyOwned(DbId),

    #[error("Item '{0}' is not owned")]
    NotOwned(String),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    /// A stored value could not be mapped onto a domain type.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// The store could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether retrying the same call later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }

    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
