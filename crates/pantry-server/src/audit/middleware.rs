//! Request auditing middleware
//!
//! For every request this middleware:
//! - resolves the caller's identity (extensions first, then gateway headers)
//! - runs the inner service inside an actor scope bound to that identity, so
//!   change records produced by the request carry the acting user
//! - for authenticated requests, writes an `action_log` row once the response
//!   is ready

use axum::{
    extract::{ConnectInfo, Request},
    response::Response,
};
use sqlx::PgPool;
use std::{
    future::Future,
    net::SocketAddr,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::{debug, error};

use super::actor;
use super::models::NewActionLog;
use super::queries::create_action_log;
use crate::middleware::auth::AuthenticatedUser;

/// Fallback when the peer address is not available
pub const UNKNOWN_CLIENT_HOST: &str = "unknown";

/// Audit logging layer
#[derive(Clone)]
pub struct AuditLayer {
    pool: PgPool,
}

impl AuditLayer {
    /// Create a new audit layer with database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<S> Layer<S> for AuditLayer {
    type Service = AuditMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuditMiddleware {
            inner,
            pool: self.pool.clone(),
        }
    }
}

/// Audit middleware service
#[derive(Clone)]
pub struct AuditMiddleware<S> {
    inner: S,
    pool: PgPool,
}

impl<S> Service<Request> for AuditMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let pool = self.pool.clone();
        let started = Instant::now();

        let user = request
            .extensions()
            .get::<AuthenticatedUser>()
            .cloned()
            .or_else(|| AuthenticatedUser::from_headers(request.headers()));
        if let Some(ref user) = user {
            request.extensions_mut().insert(user.clone());
        }

        let client_host = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT_HOST.to_string());
        let method = request.method().to_string();
        let path = request.uri().path().to_string();
        let query = request.uri().query().unwrap_or_default().to_string();

        Box::pin(actor::scope(None, async move {
            if let Some(ref user) = user {
                actor::set_actor(user.user_id);
            }

            let response = inner.call(request).await?;

            if let Some(user) = user {
                let entry = NewActionLog {
                    user_id: Some(user.user_id),
                    phone: user.phone,
                    email: user.email,
                    username: user.username,
                    role: user.role.map(|r| r.as_str().to_string()),
                    query,
                    method,
                    path,
                    status_code: i32::from(response.status().as_u16()),
                    process_time: round_seconds(started.elapsed().as_secs_f64()),
                    client_host,
                };

                match create_action_log(&pool, &entry).await {
                    Ok(row) => debug!(action_id = row.id, "Action logged"),
                    Err(e) => error!(
                        error = %e,
                        method = %entry.method,
                        path = %entry.path,
                        "Failed to write action log"
                    ),
                }
            }

            Ok(response)
        }))
    }
}

/// Round to four decimal places
fn round_seconds(secs: f64) -> f64 {
    (secs * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_seconds() {
        assert_eq!(round_seconds(0.123_456), 0.1235);
        assert_eq!(round_seconds(1.0), 1.0);
        assert_eq!(round_seconds(0.000_04), 0.0);
    }
}
