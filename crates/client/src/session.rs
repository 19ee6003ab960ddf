//! Who the client is acting for.

use crate::error::ClientError;

/// The signed-in user, or a guest browsing without an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Guest,
    SignedIn { user_id: String },
}

impl Session {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self::SignedIn {
            user_id: user_id.into(),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::SignedIn { user_id } => Some(user_id),
        }
    }

    /// The user id for a user-scoped operation.
    pub fn require_user(&self) -> Result<&str, ClientError> {
        self.user_id().ok_or(ClientError::SignInRequired)
    }
}
