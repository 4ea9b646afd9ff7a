use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{OverlayError, Result};
use crate::models::locale::Locale;
use crate::models::overlay::{
    NewOverlay, OverlayEvent, OverlayRecord, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
use crate::models::payment::PaymentMethod;
use crate::services::clock::Clock;

/// Knobs that are configuration rather than invariants.
#[derive(Debug, Clone)]
pub struct StorePolicy {
    pub locale: Locale,
    pub accepted_methods: Vec<PaymentMethod>,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            accepted_methods: PaymentMethod::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No overlay is active.
    Idle,
    Counting { id: Uuid, remaining_seconds: u64 },
    Expired(Uuid),
}

/// In-memory overlay collection, newest first. At most one record is active.
pub struct OverlayStore {
    records: Vec<OverlayRecord>,
    clock: Arc<dyn Clock>,
    policy: StorePolicy,
    events: broadcast::Sender<OverlayEvent>,
}

impl OverlayStore {
    pub fn new(clock: Arc<dyn Clock>, policy: StorePolicy, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            records: Vec::new(),
            clock,
            policy,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.events.subscribe()
    }

    pub fn policy(&self) -> &StorePolicy {
        &self.policy
    }

    /// Creates an active overlay, taking the visible slot from whatever held it.
    pub fn create(&mut self, fields: NewOverlay) -> Result<OverlayRecord> {
        let mut record = self.build_record(fields)?;
        self.deactivate_all(None);
        record.active = true;
        self.insert(record.clone());
        self.publish(OverlayEvent::Activated(record.id));
        Ok(record)
    }

    /// Adds an overlay to history without putting it on screen.
    pub fn create_inactive(&mut self, fields: NewOverlay) -> Result<OverlayRecord> {
        let record = self.build_record(fields)?;
        self.insert(record.clone());
        Ok(record)
    }

    pub fn activate(&mut self, id: Uuid) -> Result<OverlayRecord> {
        let index = self.position(id)?;
        self.deactivate_all(Some(id));

        let record = &mut self.records[index];
        record.active = true;
        record.remaining_seconds = record.full_duration_seconds();
        let record = record.clone();
        info!("Overlay {} activated for {}s", id, record.remaining_seconds);
        self.publish(OverlayEvent::Activated(id));
        Ok(record)
    }

    /// Takes the overlay off screen. `remaining_seconds` keeps its last value.
    pub fn deactivate(&mut self, id: Uuid) -> Result<OverlayRecord> {
        let index = self.position(id)?;
        let record = &mut self.records[index];
        record.active = false;
        let record = record.clone();

        info!("Overlay {} deactivated", id);
        self.publish(OverlayEvent::Deactivated(id));
        Ok(record)
    }

    /// Removes the overlay. No other record is promoted if it was active.
    pub fn delete(&mut self, id: Uuid) -> Result<OverlayRecord> {
        let index = self.position(id)?;
        let record = self.records.remove(index);

        info!("Overlay {} deleted (was active: {})", id, record.active);
        self.publish(OverlayEvent::Deleted(id));
        Ok(record)
    }

    /// Advances the active overlay by one second, expiring it at zero.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(record) = self.records.iter_mut().find(|r| r.active) else {
            return TickOutcome::Idle;
        };

        record.remaining_seconds = record.remaining_seconds.saturating_sub(1);
        if record.remaining_seconds > 0 {
            return TickOutcome::Counting {
                id: record.id,
                remaining_seconds: record.remaining_seconds,
            };
        }

        record.active = false;
        let id = record.id;
        info!("Overlay {} expired", id);
        self.publish(OverlayEvent::Expired(id));
        TickOutcome::Expired(id)
    }

    pub fn list(&self) -> Vec<OverlayRecord> {
        self.records.clone()
    }

    pub fn get(&self, id: Uuid) -> Option<&OverlayRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn active(&self) -> Option<&OverlayRecord> {
        self.records.iter().find(|r| r.active)
    }

    pub fn has_active(&self) -> bool {
        self.active().is_some()
    }

    fn build_record(&self, fields: NewOverlay) -> Result<OverlayRecord> {
        let recipient_name = fields.recipient_name.trim();
        if recipient_name.is_empty() {
            return Err(OverlayError::Validation("recipient name is required".into()));
        }

        let payment_identifier = fields.payment_identifier.trim();
        if payment_identifier.is_empty() {
            return Err(OverlayError::Validation(
                "payment identifier is required".into(),
            ));
        }

        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&fields.duration_minutes) {
            return Err(OverlayError::Validation(format!(
                "duration must be between {} and {} minutes, got {}",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, fields.duration_minutes
            )));
        }

        if !self.policy.accepted_methods.contains(&fields.payment_method) {
            return Err(OverlayError::Validation(format!(
                "payment method {} is not accepted",
                fields.payment_method
            )));
        }

        let description = match fields.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.policy.locale.help_description(recipient_name),
        };

        Ok(OverlayRecord {
            id: Uuid::new_v4(),
            recipient_name: recipient_name.to_string(),
            payment_method: fields.payment_method,
            payment_identifier: payment_identifier.to_string(),
            description,
            duration_minutes: fields.duration_minutes,
            created_at: self.clock.now(),
            active: false,
            remaining_seconds: u64::from(fields.duration_minutes) * 60,
        })
    }

    fn insert(&mut self, record: OverlayRecord) {
        info!(
            "Overlay {} created for {} via {} ({} min)",
            record.id, record.recipient_name, record.payment_method, record.duration_minutes
        );
        self.publish(OverlayEvent::Created(record.id));
        self.records.insert(0, record);
    }

    /// Takes every other record off screen, announcing each one that was showing.
    fn deactivate_all(&mut self, keep: Option<Uuid>) {
        let replaced: Vec<Uuid> = self
            .records
            .iter_mut()
            .filter(|r| r.active && Some(r.id) != keep)
            .map(|record| {
                record.active = false;
                record.id
            })
            .collect();

        for id in replaced {
            debug!("Overlay {} replaced on screen", id);
            self.publish(OverlayEvent::Deactivated(id));
        }
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(OverlayError::NotFound(id))
    }

    fn publish(&self, event: OverlayEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
