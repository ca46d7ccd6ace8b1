//! Feature modules implementing the pantry API
//!
//! Each feature is a vertical slice with its own commands, queries and routes.
//! Commands that write tracked entities take an [`EntityStore`] so that every
//! mutation reaches the change log; read-only slices take the pool directly.
//!
//! # Features
//!
//! - **ingredients**: stock items and their weight on hand
//! - **meals**: menu items and their recipes
//! - **deliveries**: incoming stock, added to ingredient weight
//! - **servings**: portions served, drawn from ingredient weight
//! - **change_log**: raw entity change records (admin)
//! - **activity_logs**: login events and the per-request action log (admin)
//! - **unified_logs**: login, request and change events in one view (admin)

pub mod activity_logs;
pub mod change_log;
pub mod deliveries;
pub mod ingredients;
pub mod meals;
pub mod servings;
pub mod shared;
pub mod unified_logs;

use axum::Router;
use sqlx::PgPool;

use crate::store::EntityStore;

/// Shared state for all feature routes
#[derive(Clone, Debug)]
pub struct FeatureState {
    pub db: PgPool,
    /// Store whose units of work feed the change interceptor
    pub store: EntityStore,
}

/// Mount every feature under its own path prefix
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/ingredients", ingredients::ingredients_routes().with_state(state.store.clone()))
        .nest("/meals", meals::meals_routes().with_state(state.store.clone()))
        .nest("/deliveries", deliveries::deliveries_routes().with_state(state.store.clone()))
        .nest("/servings", servings::servings_routes().with_state(state.store))
        .nest("/change-log", change_log::change_log_routes().with_state(state.db.clone()))
        .nest("/login-info", activity_logs::login_info_routes().with_state(state.db.clone()))
        .nest("/logging", activity_logs::action_log_routes().with_state(state.db.clone()))
        .nest("/unified-logs", unified_logs::unified_logs_routes().with_state(state.db))
}
