use dexquest_core::error::CoreError;
use dexquest_core::types::DbId;
use dexquest_db::StoreError;

/// Error type for client service operations.
///
/// Wraps [`CoreError`] and [`StoreError`] and adds client-only variants.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A domain-level error from `dexquest_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error reported by the data store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A claim is already running; the action button should stay disabled.
    #[error("A reward claim for mission {0} is already in progress")]
    ClaimInFlight(DbId),

    /// The operation needs a signed-in user.
    #[error("Sign in required")]
    SignInRequired,
}

/// Convenience type alias for service return values.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether the user should be told to try again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_transient())
    }

    /// Whether a claim lost the race against an earlier one.
    pub fn is_already_claimed(&self) -> bool {
        matches!(self, Self::Store(StoreError::AlreadyClaimed(_)))
    }

    /// Short message for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(StoreError::AlreadyClaimed(_)) => "Reward already claimed".to_string(),
            Self::Store(StoreError::NotEligible(_)) => "This mission isn't complete yet".to_string(),
            Self::Store(StoreError::InsufficientGold { required, available }) => {
                format!("Not enough gold ({available}/{required})")
            }
            Self::Store(StoreError::AlreadyOwned(_)) => "You already own this item".to_string(),
            Self::Store(StoreError::NotOwned(name)) => format!("You don't own {name}"),
            Self::Store(StoreError::NotFound { entity, .. }) => format!("That {entity} no longer exists"),
            Self::Store(e) if e.is_transient() => {
                "Couldn't reach the server, please try again".to_string()
            }
            Self::Store(e) => {
                tracing::error!(error = %e, "Store error");
                "Something went wrong".to_string()
            }
            Self::Core(CoreError::Validation(msg)) => msg.clone(),
            Self::Core(e) => {
                tracing::error!(error = %e, "Core error");
                "Something went wrong".to_string()
            }
            Self::ClaimInFlight(_) => "Claim in progress".to_string(),
            Self::SignInRequired => "Sign in to save your progress".to_string(),
        }
    }
}
