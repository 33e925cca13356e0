//! Caller identity.
//!
//! Token issuance and user accounts belong to an external identity service.
//! This module only resolves a bearer token into a [`Caller`] through the
//! [`Authenticator`] seam and exposes the result as axum extractors.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiErrorResponse;
use super::state::AppState;
use crate::domain::UserId;
use crate::infrastructure::ConfigurationError;

const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// Role / Caller
// =============================================================================

/// Authorization level of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular shopper.
    User,
    /// Store administrator.
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Identity of the caller.
    pub user_id: UserId,
    /// Authorization level.
    pub role: Role,
}

impl Caller {
    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A caller that has been verified to hold the admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCaller(pub Caller);

// =============================================================================
// Authenticator
// =============================================================================

/// Resolves a bearer token into a caller.
pub trait Authenticator: Send + Sync {
    /// Returns the caller the token belongs to, or `None` if it is not valid.
    fn authenticate(&self, token: &str) -> Option<Caller>;
}

/// Authenticator backed by a fixed token table.
///
/// The table is written as `token=user_id:role` entries separated by `,`:
///
/// ```text
/// AUTH_TOKENS=alice-token=alice:user,ops-token=ops:admin
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    callers: HashMap<String, Caller>,
}

impl StaticTokenAuthenticator {
    /// Creates an authenticator that accepts no token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, user_id: UserId, role: Role) -> Self {
        self.callers.insert(token.into(), Caller { user_id, role });
        self
    }

    /// Parses a token table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` for a malformed entry.
    pub fn parse(table: &str) -> Result<Self, ConfigurationError> {
        table
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(Self::new(), |authenticator, entry| {
                let invalid = |message: String| ConfigurationError::InvalidValue {
                    key: "AUTH_TOKENS",
                    message,
                };
                let (token, identity) = entry
                    .split_once('=')
                    .ok_or_else(|| invalid(format!("entry '{entry}' is missing '='")))?;
                let (user_id, role) = identity
                    .split_once(':')
                    .ok_or_else(|| invalid(format!("entry '{entry}' is missing ':role'")))?;
                if token.trim().is_empty() || user_id.trim().is_empty() {
                    return Err(invalid(format!("entry '{entry}' has an empty token or user")));
                }
                let role = role.trim().parse::<Role>().map_err(invalid)?;

                Ok(authenticator.with_token(token.trim(), UserId::new(user_id.trim()), role))
            })
    }

    /// Number of known tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callers.len()
    }

    /// Returns `true` when no token is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<Caller> {
        self.callers.get(token).cloned()
    }
}

// =============================================================================
// Extractors
// =============================================================================

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiErrorResponse::unauthorized("No token, authorization denied"))?;

        state
            .authenticator
            .authenticate(token)
            .ok_or_else(|| ApiErrorResponse::unauthorized("Token is not valid"))
    }
}

impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        if caller.is_admin() {
            Ok(Self(caller))
        } else {
            tracing::warn!(user_id = %caller.user_id, "Admin route refused");
            Err(ApiErrorResponse::forbidden("Access denied: admin only"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parse_reads_every_entry() {
        let authenticator =
            StaticTokenAuthenticator::parse("t1=alice:user, t2=ops:ADMIN ,").unwrap();

        assert_eq!(authenticator.len(), 2);
        assert_eq!(
            authenticator.authenticate("t1"),
            Some(Caller {
                user_id: UserId::new("alice"),
                role: Role::User,
            })
        );
        assert!(authenticator.authenticate("t2").unwrap().is_admin());
        assert_eq!(authenticator.authenticate("t3"), None);
    }

    #[rstest]
    fn parse_empty_table_accepts_nothing() {
        assert!(StaticTokenAuthenticator::parse("").unwrap().is_empty());
    }

    #[rstest]
    #[case("t1")]
    #[case("t1=alice")]
    #[case("t1=alice:root")]
    #[case("=alice:user")]
    fn parse_rejects_malformed_entries(#[case] table: &str) {
        assert!(matches!(
            StaticTokenAuthenticator::parse(table),
            Err(ConfigurationError::InvalidValue {
                key: "AUTH_TOKENS",
                ..
            })
        ));
    }
}
