use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::page::PageSession;

struct StoredSession {
    session: Arc<PageSession>,
    last_seen: Instant,
}

/// In-memory registry of mounted page sessions.
///
/// Removing a session is how a page unmounts: once the last `Arc` is gone its
/// timers are aborted and late fetch results are ignored. Sessions that are
/// never deleted explicitly are evicted once they sit idle for too long.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
}

impl SessionStore {
    pub async fn insert(&self, session: Arc<PageSession>) {
        let stored = StoredSession {
            session,
            last_seen: Instant::now(),
        };
        self.sessions
            .write()
            .await
            .insert(stored.session.id(), stored);
    }

    /// Looks up a session and marks it as seen.
    pub async fn get(&self, id: Uuid) -> Option<Arc<PageSession>> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(&id)?;
        stored.last_seen = Instant::now();
        Some(Arc::clone(&stored.session))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Page session torn down");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session not seen within `idle`. Returns how many were dropped.
    pub async fn evict_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, stored| {
            let keep = now.duration_since(stored.last_seen) < idle;
            if !keep {
                debug!(session_id = %id, "Evicting idle page session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Spawns the background sweep that evicts sessions idle for `idle`.
    /// Runs every quarter of `idle`, and at least once a second.
    pub fn spawn_sweeper(&self, idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = (idle / 4).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(idle).await;
                if evicted > 0 {
                    let remaining = store.len().await;
                    info!(evicted, remaining, "Evicted idle page sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CardSources, ImageSource};
    use crate::genai_client::GenAiClient;
    use crate::page::PageFactory;

    fn factory() -> PageFactory {
        let client = GenAiClient::new(None, "http://127.0.0.1:9").unwrap();
        let sources = CardSources {
            image: ImageSource::Disabled,
            ..CardSources::default()
        };
        PageFactory::new(client, sources)
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = SessionStore::default();
        let session = factory().mount();
        let id = session.id();

        store.insert(session).await;
        assert_eq!(store.len().await, 1);
        assert!(store.get(id).await.is_some());

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_keeps_a_session_alive() {
        let store = SessionStore::default();
        let active = factory().mount();
        let abandoned = factory().mount();
        let (active_id, abandoned_id) = (active.id(), abandoned.id());
        store.insert(active).await;
        store.insert(abandoned).await;

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        assert!(store.get(active_id).await.is_some());
        tokio::time::advance(Duration::from_secs(15 * 60)).await;

        assert_eq!(store.evict_idle(Duration::from_secs(30 * 60)).await, 1);
        assert!(store.get(active_id).await.is_some());
        assert!(store.get(abandoned_id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_abandoned_sessions() {
        let store = SessionStore::default();
        let sweeper = store.spawn_sweeper(Duration::from_secs(60));

        for _ in 0..50 {
            store.insert(factory().mount()).await;
        }
        assert_eq!(store.len().await, 50);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.len().await, 50);

        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(store.len().await, 0);

        sweeper.abort();
    }
}
