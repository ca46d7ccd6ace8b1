//! Acting-user context
//!
//! The identity of the user behind the current request lives in a tokio
//! task-local slot. Each request runs its handler inside [`scope`], so two
//! concurrent requests never observe each other's actor, while every future
//! awaited inside the same request chain sees the same value.
//!
//! The slot is written once by the request middleware after identity has been
//! resolved and read by the change interceptor when it builds a record.

use std::cell::Cell;
use std::future::Future;

use tracing::warn;

/// Identifier of an application user
pub type ActorId = i64;

tokio::task_local! {
    static CURRENT_ACTOR: Cell<Option<ActorId>>;
}

/// Run `fut` with a fresh actor slot initialised to `actor`
pub async fn scope<F>(actor: Option<ActorId>, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_ACTOR.scope(Cell::new(actor), fut).await
}

/// Run a synchronous closure with a fresh actor slot
pub fn sync_scope<R>(actor: Option<ActorId>, f: impl FnOnce() -> R) -> R {
    CURRENT_ACTOR.sync_scope(Cell::new(actor), f)
}

/// Bind `id` as the acting user of the current scope
///
/// Returns `false` (and changes nothing) when called outside of a scope.
pub fn set_actor(id: ActorId) -> bool {
    let bound = CURRENT_ACTOR.try_with(|slot| slot.set(Some(id))).is_ok();
    if !bound {
        warn!(actor_id = id, "set_actor called outside of an actor scope");
    }
    bound
}

/// The acting user of the current scope, if any
pub fn get_actor() -> Option<ActorId> {
    CURRENT_ACTOR.try_with(Cell::get).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_scope_is_none() {
        assert_eq!(get_actor(), None);
        assert!(!set_actor(7));
        assert_eq!(get_actor(), None);
    }

    #[test]
    fn test_sync_scope_set_and_get() {
        sync_scope(None, || {
            assert_eq!(get_actor(), None);
            assert!(set_actor(42));
            assert_eq!(get_actor(), Some(42));
        });
        assert_eq!(get_actor(), None);
    }

    #[tokio::test]
    async fn test_nested_calls_share_actor() {
        async fn deep() -> Option<ActorId> {
            tokio::task::yield_now().await;
            get_actor()
        }

        let seen = scope(None, async {
            set_actor(3);
            deep().await
        })
        .await;

        assert_eq!(seen, Some(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scopes_are_isolated() {
        let handles: Vec<_> = (0..32)
            .map(|id| {
                tokio::spawn(scope(None, async move {
                    set_actor(id);
                    for _ in 0..10 {
                        tokio::task::yield_now().await;
                        assert_eq!(get_actor(), Some(id));
                    }
                    get_actor()
                }))
            })
            .collect();

        for (id, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(id as ActorId));
        }
    }

    #[tokio::test]
    async fn test_spawned_task_does_not_inherit() {
        let inner = scope(Some(9), async { tokio::spawn(async { get_actor() }).await.unwrap() }).await;
        assert_eq!(inner, None);
    }
}
