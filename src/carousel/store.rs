use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::api::api_client::ApiClient;
use crate::api::types::{MediaUpload, Slide};
use crate::error::{FetchError, SaveError};

/// The full slot set together with its active subset. Both are built in one
/// step and swapped in as a unit, so no reader ever sees one without the
/// other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideSnapshot {
    pub slides: Vec<Slide>,
    pub active: Vec<Slide>,
    /// Sequence number of the load that produced this set; 0 before the
    /// first successful load.
    pub revision: u64,
}

impl SlideSnapshot {
    pub fn new(slides: Vec<Slide>, revision: u64) -> Self {
        let active = active_subset(&slides);
        Self {
            slides,
            active,
            revision,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.revision > 0
    }

    pub fn slide_for_slot(&self, slot_id: u32) -> Option<&Slide> {
        self.slides.iter().find(|s| s.slot_id == slot_id)
    }
}

/// Slides flagged for rotation, in the order the repository returned them.
pub fn active_subset(slides: &[Slide]) -> Vec<Slide> {
    slides.iter().filter(|s| s.is_active).cloned().collect()
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    Replaced(Arc<SlideSnapshot>),
    LoadFailed(FetchError),
}

struct Inner {
    snapshot: Arc<SlideSnapshot>,
    applied_seq: u64,
}

/// Sole owner of slot data and the only component talking to the slide
/// repository.
pub struct SlideStore {
    api: ApiClient,
    inner: RwLock<Inner>,
    next_seq: AtomicU64,
    events: broadcast::Sender<StoreEvent>,
}

impl SlideStore {
    pub fn new(api: ApiClient) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            api,
            inner: RwLock::new(Inner {
                snapshot: Arc::new(SlideSnapshot::default()),
                applied_seq: 0,
            }),
            next_seq: AtomicU64::new(0),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Arc<SlideSnapshot> {
        self.inner.read().await.snapshot.clone()
    }

    /// Fetch every slot and replace the held set. On failure the previous set
    /// stays in place. A response older than one already applied is dropped
    /// and the newer set is returned instead.
    pub async fn load(&self) -> Result<Arc<SlideSnapshot>, FetchError> {
        let seq = self.begin_load();
        log::debug!("load #{}: fetching slides", seq);

        match self.api.get_slides().await {
            Ok(slides) => Ok(self.apply(seq, slides).await),
            Err(e) => {
                self.fail(seq, &e).await;
                Err(e)
            }
        }
    }

    /// Send a partial update for one slot. Does not touch the held set; the
    /// caller reloads after a successful save.
    pub async fn save_slot(
        &self,
        token: &str,
        slot_id: u32,
        fields: Vec<(&'static str, String)>,
        media: Option<&MediaUpload>,
    ) -> Result<Slide, SaveError> {
        log::debug!(
            "saving slot {} ({} fields, media: {})",
            slot_id,
            fields.len(),
            media.map(|m| m.file_name.as_str()).unwrap_or("unchanged")
        );
        self.api.update_slide(token, slot_id, fields, media).await
    }

    pub(crate) fn begin_load(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn apply(&self, seq: u64, slides: Vec<Slide>) -> Arc<SlideSnapshot> {
        let mut inner = self.inner.write().await;
        if seq <= inner.applied_seq {
            log::debug!(
                "load #{} is stale (#{} already applied), dropping",
                seq,
                inner.applied_seq
            );
            return inner.snapshot.clone();
        }

        let snapshot = Arc::new(SlideSnapshot::new(slides, seq));
        inner.applied_seq = seq;
        inner.snapshot = snapshot.clone();
        log::info!(
            "Slides loaded: {} slots, {} active",
            snapshot.slides.len(),
            snapshot.active.len()
        );
        // Sent under the write lock so events go out in apply order.
        let _ = self.events.send(StoreEvent::Replaced(snapshot.clone()));
        snapshot
    }

    /// Report a failed load, unless a newer one already landed.
    pub(crate) async fn fail(&self, seq: u64, error: &FetchError) {
        let inner = self.inner.read().await;
        if seq <= inner.applied_seq {
            log::debug!(
                "load #{} failed after #{} was applied, not reported: {}",
                seq,
                inner.applied_seq,
                error
            );
            return;
        }
        log::warn!("load #{} failed: {}", seq, error);
        let _ = self.events.send(StoreEvent::LoadFailed(error.clone()));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::types::{ButtonStyle, MediaType};

    pub(crate) fn slide(slot_id: u32, is_active: bool, media_type: MediaType) -> Slide {
        Slide {
            id: slot_id as i64 * 10,
            slot_id,
            is_active,
            media: Some(format!("http://cdn.local/slot{}", slot_id)),
            media_type,
            headline: format!("Slot {}", slot_id),
            subheadline: String::new(),
            button_count: 1,
            btn1_text: "Start".to_string(),
            btn1_link: "/start".to_string(),
            btn1_style: ButtonStyle::White,
            btn2_text: String::new(),
            btn2_link: String::new(),
            btn2_style: ButtonStyle::Outline,
        }
    }

    pub(crate) fn offline_store() -> SlideStore {
        SlideStore::new(ApiClient::new("http://127.0.0.1:9"))
    }

    #[test]
    fn active_subset_keeps_repository_order() {
        let slides = vec![
            slide(3, true, MediaType::Image),
            slide(1, false, MediaType::Image),
            slide(2, true, MediaType::Video),
        ];
        let active = active_subset(&slides);
        let slots: Vec<u32> = active.iter().map(|s| s.slot_id).collect();
        assert_eq!(slots, vec![3, 2]);
    }

    #[tokio::test]
    async fn apply_replaces_set_and_notifies() {
        let store = offline_store();
        let mut rx = store.subscribe();
        assert!(!store.snapshot().await.is_loaded());

        let seq = store.begin_load();
        store
            .apply(seq, vec![slide(1, true, MediaType::Image), slide(2, false, MediaType::Image)])
            .await;

        match rx.recv().await.unwrap() {
            StoreEvent::Replaced(snapshot) => {
                assert_eq!(snapshot.slides.len(), 2);
                assert_eq!(snapshot.active.len(), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(store.snapshot().await.is_loaded());
    }

    #[tokio::test]
    async fn stale_response_is_dropped() {
        let store = offline_store();
        let older = store.begin_load();
        let newer = store.begin_load();

        store.apply(newer, vec![slide(1, true, MediaType::Image)]).await;
        let kept = store
            .apply(older, vec![slide(1, false, MediaType::Image)])
            .await;

        assert_eq!(kept.revision, newer);
        assert_eq!(store.snapshot().await.active.len(), 1);
    }

    #[tokio::test]
    async fn stale_failure_is_not_broadcast() {
        let store = offline_store();
        let older = store.begin_load();
        let newer = store.begin_load();
        store.apply(newer, vec![slide(1, true, MediaType::Image)]).await;
        let mut rx = store.subscribe();

        let error = FetchError::Network("connection reset".to_string());
        store.fail(older, &error).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        let latest = store.begin_load();
        store.fail(latest, &error).await;
        assert!(matches!(rx.try_recv(), Ok(StoreEvent::LoadFailed(_))));
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_set() {
        let store = offline_store();
        let seq = store.begin_load();
        store.apply(seq, vec![slide(1, true, MediaType::Image)]).await;
        let mut rx = store.subscribe();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(matches!(rx.recv().await.unwrap(), StoreEvent::LoadFailed(_)));
        assert_eq!(store.snapshot().await.slides.len(), 1);
    }
}
