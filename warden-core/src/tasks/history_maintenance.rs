// warden-core/src/tasks/history_maintenance.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};
use warden_common::traits::repository_traits::HistoryRepository;

/// Spawns a background task that periodically prunes every history window
/// down to `keep_count` records. Runs until the handle is aborted.
pub fn spawn_history_prune_task(
    store: Arc<dyn HistoryRepository>,
    interval: Duration,
    keep_count: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, keep_count, "History prune task started");
        loop {
            sleep(interval).await;
            match store.prune_all(keep_count).await {
                Ok(0) => debug!("History prune: nothing to remove"),
                Ok(removed) => info!(removed, "History prune removed old records"),
                Err(e) => error!("History prune failed: {:?}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryHistoryStore;
    use chrono::Utc;
    use warden_common::models::{HistoryRecord, Message};

    #[tokio::test(start_paused = true)]
    async fn prunes_on_each_tick() {
        let store = Arc::new(InMemoryHistoryStore::default());
        for i in 0..6 {
            let msg = Message {
                message_id: Some(i),
                user_id: 1,
                group_id: 2,
                sender_name: "Reza".to_string(),
                text: format!("msg {i}"),
                created_at: Utc::now(),
                reply_to_id: None,
                reply_to_text: None,
            };
            store.append(&HistoryRecord::from_message(&msg)).await.unwrap();
        }

        let handle = spawn_history_prune_task(store.clone(), Duration::from_secs(60), 4);
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert_eq!(store.count(1, 2), 4);
        handle.abort();
    }
}
