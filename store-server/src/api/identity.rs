//! Request identity
//!
//! The storefront sits behind a gateway that authenticates sessions
//! and forwards the result as headers: `x-user-id` for the account id
//! and `x-role: admin` for back-office staff. Requests without either
//! header are anonymous (guest checkout).

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::orders::Actor;
use shared::{AppError, AppResult, ErrorCode};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-role";
const ADMIN_ROLE: &str = "admin";

/// Caller identity as asserted by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Admin,
    Customer(String),
    Anonymous,
}

impl Identity {
    /// Actor for engine calls; anonymous callers have none
    pub fn actor(&self) -> Option<Actor> {
        match self {
            Identity::Admin => Some(Actor::Admin),
            Identity::Customer(id) => Some(Actor::Customer(id.clone())),
            Identity::Anonymous => None,
        }
    }

    /// Require any authenticated actor
    pub fn require(&self) -> AppResult<Actor> {
        self.actor()
            .ok_or_else(|| AppError::forbidden("Authentication required"))
    }

    /// Require the admin role
    pub fn require_admin(&self) -> AppResult<Actor> {
        match self {
            Identity::Admin => Ok(Actor::Admin),
            _ => Err(AppError::new(ErrorCode::AdminRequired)),
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok());
        if role == Some(ADMIN_ROLE) {
            return Ok(Identity::Admin);
        }

        match parts.headers.get(USER_ID_HEADER) {
            Some(value) => {
                let user_id = value
                    .to_str()
                    .map_err(|_| AppError::invalid_request("Malformed user id header"))?;
                if user_id.is_empty() {
                    return Err(AppError::invalid_request("Empty user id header"));
                }
                Ok(Identity::Customer(user_id.to_string()))
            }
            None => Ok(Identity::Anonymous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_mapping() {
        assert_eq!(Identity::Admin.actor(), Some(Actor::Admin));
        assert_eq!(
            Identity::Customer("u1".into()).actor(),
            Some(Actor::Customer("u1".into()))
        );
        assert_eq!(Identity::Anonymous.actor(), None);
    }

    #[test]
    fn test_require_admin() {
        assert!(Identity::Admin.require_admin().is_ok());
        assert_eq!(
            Identity::Customer("u1".into())
                .require_admin()
                .unwrap_err()
                .code,
            ErrorCode::AdminRequired
        );
        assert_eq!(
            Identity::Anonymous.require_admin().unwrap_err().code,
            ErrorCode::AdminRequired
        );
    }
}
