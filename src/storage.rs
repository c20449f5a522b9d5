//! Draft persistence — a single serialized record under one well-known key,
//! written through a debounced saver so every keystroke does not hit disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::StorageError;
use crate::wizard::draft::OfferDraft;

/// Quiet period after the last mutation before the draft is persisted.
pub const SAVE_DEBOUNCE: Duration = Duration::from_secs(1);

/// File name the draft is stored under (the one well-known key).
pub const DRAFT_KEY: &str = "offer_draft.json";

/// Key-value persistence for the in-progress draft.
///
/// Saves overwrite wholesale; clears remove wholesale.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save(&self, draft: &OfferDraft) -> Result<(), StorageError>;
    async fn load(&self) -> Result<Option<OfferDraft>, StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed store: one JSON file in the data directory.
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(DRAFT_KEY),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    /// Write the draft. A failed write clears the existing entry once and
    /// retries exactly once; a failed retry propagates so the caller can
    /// log and continue unpersisted.
    async fn save(&self, draft: &OfferDraft) -> Result<(), StorageError> {
        let json = serde_json::to_vec(draft)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        if let Err(first) = tokio::fs::write(&self.path, &json).await {
            tracing::warn!(
                path = %self.path.display(),
                error = %first,
                "Draft write failed, clearing and retrying once"
            );
            let _ = tokio::fs::remove_file(&self.path).await;
            tokio::fs::write(&self.path, &json).await?;
        }
        Ok(())
    }

    /// Load the stored draft. Corrupt data is logged, deleted, and treated
    /// as absent so a bad entry cannot wedge every subsequent start.
    async fn load(&self) -> Result<Option<OfferDraft>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<OfferDraft>(&bytes) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Stored draft is corrupt, discarding it"
                );
                let _ = tokio::fs::remove_file(&self.path).await;
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Debounced save scheduler — at most one pending save per draft.
///
/// Scheduling aborts any not-yet-fired save before arming a new one, so
/// only the final state after a pause is persisted. Save failures are
/// logged and the session continues unpersisted.
pub struct DebouncedSaver {
    store: Arc<dyn DraftStore>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    pub fn new(store: Arc<dyn DraftStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: None,
        }
    }

    /// Arm a save of `draft` after the quiet period, cancelling any save
    /// still pending from an earlier mutation.
    pub fn schedule(&mut self, draft: OfferDraft) {
        self.cancel();
        let store = Arc::clone(&self.store);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = store.save(&draft).await {
                tracing::warn!(error = %e, "Debounced draft save failed, continuing unpersisted");
            }
        }));
    }

    /// Cancel any pending save without firing it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn draft_with_mls(id: &str) -> OfferDraft {
        OfferDraft {
            mls_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());

        assert!(store.load().await.unwrap().is_none());

        let draft = draft_with_mls("2254520");
        store.save(&draft).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(draft));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing an already-empty store is not an error.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_draft_is_discarded_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());

        tokio::fs::write(store.path(), b"{not valid json")
            .await
            .unwrap();

        assert!(store.load().await.unwrap().is_none());
        // The corrupt entry must be gone, not left for a later crash loop.
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails_after_retry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path().join("does-not-exist"));
        let err = store.save(&draft_with_mls("1")).await;
        assert!(err.is_err());
    }

    /// Store that records every draft saved to it.
    struct RecordingStore {
        saves: Mutex<Vec<OfferDraft>>,
    }

    #[async_trait]
    impl DraftStore for RecordingStore {
        async fn save(&self, draft: &OfferDraft) -> Result<(), StorageError> {
            self.saves.lock().unwrap().push(draft.clone());
            Ok(())
        }
        async fn load(&self) -> Result<Option<OfferDraft>, StorageError> {
            Ok(self.saves.lock().unwrap().last().cloned())
        }
        async fn clear(&self) -> Result<(), StorageError> {
            self.saves.lock().unwrap().clear();
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn two_schedules_within_window_write_once_with_latest() {
        let store = Arc::new(RecordingStore {
            saves: Mutex::new(Vec::new()),
        });
        let mut saver = DebouncedSaver::new(
            Arc::clone(&store) as Arc<dyn DraftStore>,
            Duration::from_millis(50),
        );

        saver.schedule(draft_with_mls("first"));
        tokio::time::sleep(Duration::from_millis(10)).await;
        saver.schedule(draft_with_mls("second"));

        tokio::time::sleep(Duration::from_millis(200)).await;

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].mls_id.as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn separated_schedules_each_fire() {
        let store = Arc::new(RecordingStore {
            saves: Mutex::new(Vec::new()),
        });
        let mut saver = DebouncedSaver::new(
            Arc::clone(&store) as Arc<dyn DraftStore>,
            Duration::from_millis(50),
        );

        saver.schedule(draft_with_mls("first"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        saver.schedule(draft_with_mls("second"));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.saves.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_save() {
        let store = Arc::new(RecordingStore {
            saves: Mutex::new(Vec::new()),
        });
        let mut saver = DebouncedSaver::new(
            Arc::clone(&store) as Arc<dyn DraftStore>,
            Duration::from_millis(50),
        );

        saver.schedule(draft_with_mls("doomed"));
        saver.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.saves.lock().unwrap().is_empty());
    }
}
