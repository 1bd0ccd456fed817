//! Errors returned by the session controller's network flows.

use crate::api::ApiError;

#[derive(Debug)]
pub enum SessionError {
    /// The flow needs an authenticated session
    NotLoggedIn,
    /// The signed-in user's role cannot use this flow
    RoleNotEligible,
    Api(ApiError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotLoggedIn => write!(f, "No user logged in"),
            SessionError::RoleNotEligible => {
                write!(f, "Only restricted users can request employee access")
            }
            SessionError::Api(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(e: ApiError) -> Self {
        SessionError::Api(e)
    }
}
