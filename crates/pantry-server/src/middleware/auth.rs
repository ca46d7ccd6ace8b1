//! Request identity
//!
//! Tokens are issued and verified by the gateway in front of this service,
//! which forwards the verified identity in `x-user-*` headers. Handlers read
//! it through the [`CurrentUser`] and [`AdminUser`] extractors.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::response::ErrorResponse;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_PHONE_HEADER: &str = "x-user-phone";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role of an application user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Cook,
    Admin,
    Manager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cook => "cook",
            Self::Admin => "admin",
            Self::Manager => "manager",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cook" => Ok(Self::Cook),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of the user behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

impl AuthenticatedUser {
    /// Read the identity forwarded by the gateway
    ///
    /// Returns `None` when `x-user-id` is missing or not an integer. An
    /// unknown role is ignored rather than rejected.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let user_id = text(USER_ID_HEADER)?.parse().ok()?;
        Some(Self {
            user_id,
            username: text(USER_NAME_HEADER),
            email: text(USER_EMAIL_HEADER),
            phone: text(USER_PHONE_HEADER),
            role: text(USER_ROLE_HEADER).and_then(|r| r.parse().ok()),
        })
    }

    /// Identity from request extensions, falling back to gateway headers
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .or_else(|| Self::from_headers(&parts.headers))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(UserRole::Admin)
    }
}

/// Why an identity extractor refused the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    Unauthenticated,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Authentication required")
            },
            Self::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "Administrator role required"),
        };
        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Any authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        AuthenticatedUser::from_parts(parts)
            .map(CurrentUser)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// An authenticated user with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_parts(parts).ok_or(AuthRejection::Unauthenticated)?;
        if user.is_admin() {
            Ok(AdminUser(user))
        } else {
            Err(AuthRejection::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_from_headers_full_identity() {
        let user = AuthenticatedUser::from_headers(&headers(&[
            (USER_ID_HEADER, "12"),
            (USER_NAME_HEADER, "aziza"),
            (USER_EMAIL_HEADER, "aziza@example.com"),
            (USER_PHONE_HEADER, "+998901234567"),
            (USER_ROLE_HEADER, "Admin"),
        ]))
        .unwrap();

        assert_eq!(user.user_id, 12);
        assert_eq!(user.username.as_deref(), Some("aziza"));
        assert_eq!(user.role, Some(UserRole::Admin));
        assert!(user.is_admin());
    }

    #[test]
    fn test_from_headers_requires_numeric_id() {
        assert!(AuthenticatedUser::from_headers(&headers(&[])).is_none());
        assert!(AuthenticatedUser::from_headers(&headers(&[(USER_ID_HEADER, "abc")])).is_none());
    }

    #[test]
    fn test_unknown_role_is_ignored() {
        let user = AuthenticatedUser::from_headers(&headers(&[
            (USER_ID_HEADER, "3"),
            (USER_ROLE_HEADER, "chef"),
        ]))
        .unwrap();
        assert_eq!(user.role, None);
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn test_admin_extractor() {
        let (mut parts, _) = Request::builder()
            .header(USER_ID_HEADER, "1")
            .header(USER_ROLE_HEADER, "cook")
            .body(())
            .unwrap()
            .into_parts();
        let rejection = AdminUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection, AuthRejection::Forbidden);

        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let rejection = AdminUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(rejection, AuthRejection::Unauthenticated);
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);

        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(AuthenticatedUser {
            user_id: 5,
            username: None,
            email: None,
            phone: None,
            role: Some(UserRole::Admin),
        });
        let AdminUser(user) = AdminUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id, 5);
    }
}
