use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{OverlayError, Result};
use crate::models::locale::Locale;
use crate::models::overlay::{NewOverlay, OverlayEvent, OverlayRecord, Session};
use crate::services::atomic_metrics::{AtomicMetrics, MetricsSnapshot};
use crate::services::overlay_store::{OverlayStore, TickOutcome};
use crate::services::renderer::{self, OverlayFrame};
use crate::services::share_link;

/// Shared entry point for every surface. One mutex serializes all store
/// mutations, ticks included.
pub struct OverlayService {
    store: Mutex<OverlayStore>,
    wake: Notify,
    metrics: AtomicMetrics,
    share_base: Url,
    locale: Locale,
}

impl OverlayService {
    pub fn new(store: OverlayStore, share_base: Url) -> Self {
        let locale = store.policy().locale;
        Self {
            store: Mutex::new(store),
            wake: Notify::new(),
            metrics: AtomicMetrics::new(),
            share_base,
            locale,
        }
    }

    pub fn create(
        &self,
        session: Session,
        fields: NewOverlay,
        activate: bool,
    ) -> Result<OverlayRecord> {
        self.authorize(session, "create")?;

        let (record, replaced) = {
            let mut store = self.store.lock();
            let previous = store.active().map(|r| r.id);
            if activate {
                (store.create(fields)?, previous)
            } else {
                (store.create_inactive(fields)?, None)
            }
        };

        self.metrics.increment_created();
        if replaced.is_some() {
            self.metrics.increment_deactivated();
        }
        if record.active {
            self.metrics.increment_activated();
            self.wake.notify_one();
        }
        Ok(record)
    }

    pub fn activate(&self, session: Session, id: Uuid) -> Result<OverlayRecord> {
        self.authorize(session, "activate")?;
        let (record, previous) = {
            let mut store = self.store.lock();
            let previous = store.active().map(|r| r.id);
            (store.activate(id)?, previous)
        };
        if previous.is_some_and(|prev| prev != id) {
            self.metrics.increment_deactivated();
        }
        self.metrics.increment_activated();
        self.wake.notify_one();
        Ok(record)
    }

    pub fn deactivate(&self, session: Session, id: Uuid) -> Result<OverlayRecord> {
        self.authorize(session, "deactivate")?;
        let record = self.store.lock().deactivate(id)?;
        self.metrics.increment_deactivated();
        Ok(record)
    }

    pub fn delete(&self, session: Session, id: Uuid) -> Result<OverlayRecord> {
        self.authorize(session, "delete")?;
        let record = self.store.lock().delete(id)?;
        self.metrics.increment_deleted();
        Ok(record)
    }

    pub fn list(&self, session: Session) -> Result<Vec<OverlayRecord>> {
        self.authorize(session, "list")?;
        Ok(self.store.lock().list())
    }

    /// Live-mode frame of whatever is on screen right now.
    pub fn live_frame(&self, session: Session) -> Result<OverlayFrame> {
        self.authorize(session, "view")?;
        let store = self.store.lock();
        Ok(renderer::live_frame(store.active(), self.locale))
    }

    pub fn subscribe(&self, session: Session) -> Result<broadcast::Receiver<OverlayEvent>> {
        self.authorize(session, "subscribe")?;
        Ok(self.store.lock().subscribe())
    }

    /// Called by the countdown engine once per period.
    pub fn tick(&self) -> TickOutcome {
        let outcome = self.store.lock().tick();
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Counting { .. } => self.metrics.increment_ticks(),
            TickOutcome::Expired(_) => {
                self.metrics.increment_ticks();
                self.metrics.increment_expired();
            }
        }
        outcome
    }

    pub fn has_active(&self) -> bool {
        self.store.lock().has_active()
    }

    /// Resolves once something has been put on screen since the last call.
    pub async fn activation(&self) {
        self.wake.notified().await
    }

    pub fn share_url(&self, record: &OverlayRecord) -> Url {
        share_link::share_url(&self.share_base, record)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn authorize(&self, session: Session, operation: &str) -> Result<()> {
        if session.authenticated {
            debug!("Authorized {}", operation);
            Ok(())
        } else {
            warn!("Rejected unauthenticated {}", operation);
            Err(OverlayError::Unauthorized)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::payment::PaymentMethod;
    use crate::services::clock::SystemClock;
    use crate::services::overlay_store::StorePolicy;
    use std::sync::Arc;

    pub(crate) fn service() -> OverlayService {
        let store = OverlayStore::new(Arc::new(SystemClock), StorePolicy::default(), 64);
        OverlayService::new(store, Url::parse("http://localhost:3000").unwrap())
    }

    pub(crate) fn fields(minutes: u32) -> NewOverlay {
        NewOverlay {
            recipient_name: "Maria".into(),
            payment_method: PaymentMethod::Paypal,
            payment_identifier: "jdoe".into(),
            description: None,
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_anonymous_session_cannot_mutate() {
        let service = service();
        let anon = Session::anonymous();

        assert_eq!(
            service.create(anon, fields(5), true),
            Err(OverlayError::Unauthorized)
        );
        assert!(service.list(Session::authenticated()).unwrap().is_empty());

        let record = service
            .create(Session::authenticated(), fields(5), true)
            .unwrap();
        assert_eq!(service.activate(anon, record.id), Err(OverlayError::Unauthorized));
        assert_eq!(service.deactivate(anon, record.id), Err(OverlayError::Unauthorized));
        assert_eq!(service.delete(anon, record.id), Err(OverlayError::Unauthorized));
        assert!(service.has_active());
    }

    #[test]
    fn test_metrics_follow_lifecycle() {
        let service = service();
        let session = Session::authenticated();
        let record = service.create(session, fields(1), true).unwrap();
        service.create(session, fields(2), false).unwrap();

        for _ in 0..60 {
            service.tick();
        }
        assert_eq!(service.tick(), TickOutcome::Idle);
        service.delete(session, record.id).unwrap();

        let metrics = service.metrics();
        assert_eq!(metrics.created, 2);
        assert_eq!(metrics.activated, 1);
        assert_eq!(metrics.expired, 1);
        assert_eq!(metrics.ticks, 60);
        assert_eq!(metrics.deleted, 1);
    }

    #[test]
    fn test_replacing_on_screen_counts_as_deactivation() {
        let service = service();
        let session = Session::authenticated();
        let first = service.create(session, fields(5), true).unwrap();
        let second = service.create(session, fields(5), true).unwrap();
        assert_eq!(service.metrics().deactivated, 1);

        service.activate(session, first.id).unwrap();
        assert_eq!(service.metrics().deactivated, 2);

        // Re-activating what is already on screen replaces nothing.
        service.activate(session, first.id).unwrap();
        assert_eq!(service.metrics().deactivated, 2);

        service.create(session, fields(5), false).unwrap();
        assert_eq!(service.metrics().deactivated, 2);
        assert!(!service.list(session).unwrap().iter().any(|r| r.id == second.id && r.active));
    }

    #[test]
    fn test_live_frame_tracks_ticks() {
        let service = service();
        let session = Session::authenticated();
        service.create(session, fields(1), true).unwrap();
        for _ in 0..55 {
            service.tick();
        }

        let frame = service.live_frame(session).unwrap();
        assert_eq!(frame.remaining, "0:05");
        assert_eq!(frame.description, "Help Maria");
        assert!(!frame.expired);
    }
}
