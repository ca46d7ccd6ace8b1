//! Mediator wiring for feature commands and queries

pub use mediator::DefaultAsyncMediator;

use crate::store::EntityStore;

pub mod middleware;

pub type AppMediator = DefaultAsyncMediator;

/// Register every feature handler
///
/// Command handlers receive the entity store so their writes are audited;
/// query handlers receive its pool.
pub fn build_mediator(store: EntityStore) -> AppMediator {
    DefaultAsyncMediator::builder()
        // Ingredients
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::ingredients::commands::create::handle(store, cmd).await }
            }
        })
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::ingredients::commands::update::handle(store, cmd).await }
            }
        })
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::ingredients::commands::delete::handle(store, cmd).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::ingredients::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::ingredients::queries::get::handle(pool, query).await }
            }
        })
        // Meals
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::meals::commands::create::handle(store, cmd).await }
            }
        })
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::meals::commands::rename::handle(store, cmd).await }
            }
        })
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::meals::commands::delete::handle(store, cmd).await }
            }
        })
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::meals::commands::set_ingredient::handle(store, cmd).await }
            }
        })
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::meals::commands::remove_ingredient::handle(store, cmd).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::meals::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::meals::queries::get::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::meals::queries::list_ingredients::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::meals::queries::get_ingredient::handle(pool, query).await }
            }
        })
        // Deliveries
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::deliveries::commands::create::handle(store, cmd).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::deliveries::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::deliveries::commands::delete::handle(store, cmd).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::deliveries::queries::get::handle(pool, query).await }
            }
        })
        // Servings
        .add_handler({
            let store = store.clone();
            move |cmd| {
                let store = store.clone();
                async move { crate::features::servings::commands::create::handle(store, cmd).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::servings::queries::list::handle(pool, query).await }
            }
        })
        // Audit trails
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::change_log::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::unified_logs::queries::list::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::activity_logs::queries::login_info::handle(pool, query).await }
            }
        })
        .add_handler({
            let pool = store.pool().clone();
            move |query| {
                let pool = pool.clone();
                async move { crate::features::activity_logs::queries::actions::handle(pool, query).await }
            }
        })
        .build()
}
