//! Routes reaction-add events to the paginator waiting on that message.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use discord_client::Snowflake;
use discord_client::models::ReactionAdd;
use tokio::sync::mpsc;

/// Pending reactions per paginator. Reactions arriving while the buffer is
/// full are dropped (logged at debug); the user can react again.
const SUBSCRIPTION_BUFFER: usize = 16;

type Routes = HashMap<Snowflake, mpsc::Sender<ReactionAdd>>;

/// Registry of live paginators keyed by the paged message id.
#[derive(Clone, Default)]
pub struct ReactionRouter {
    routes: Arc<Mutex<Routes>>,
}

impl ReactionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Routes> {
        self.routes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start receiving reactions for `message_id`. The route is removed
    /// when the returned subscription is dropped.
    pub fn subscribe(&self, message_id: Snowflake) -> ReactionSubscription {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        if self.lock().insert(message_id, tx).is_some() {
            tracing::warn!(%message_id, "Replaced an existing reaction route");
        }
        ReactionSubscription {
            message_id,
            router: self.clone(),
            rx,
        }
    }

    /// Forward a reaction to its subscriber. Returns false if nobody listens.
    pub fn route(&self, event: ReactionAdd) -> bool {
        let message_id = event.message_id;
        let Some(tx) = self.lock().get(&message_id).cloned() else {
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(%message_id, "Reaction dropped: subscriber busy");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub fn active_routes(&self) -> usize {
        self.lock().len()
    }

    fn unsubscribe(&self, message_id: Snowflake) {
        self.lock().remove(&message_id);
    }
}

/// Receiving end of one route.
pub struct ReactionSubscription {
    message_id: Snowflake,
    router: ReactionRouter,
    rx: mpsc::Receiver<ReactionAdd>,
}

impl ReactionSubscription {
    pub fn message_id(&self) -> Snowflake {
        self.message_id
    }

    pub async fn recv(&mut self) -> Option<ReactionAdd> {
        self.rx.recv().await
    }
}

impl Drop for ReactionSubscription {
    fn drop(&mut self) {
        self.router.unsubscribe(self.message_id);
    }
}
