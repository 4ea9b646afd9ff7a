use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::PaymentMethod;

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 15;

/// One donation overlay and its timer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRecord {
    pub id: Uuid,
    pub recipient_name: String,
    pub payment_method: PaymentMethod,
    pub payment_identifier: String,
    pub description: String,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    pub remaining_seconds: u64,
}

impl OverlayRecord {
    pub fn full_duration_seconds(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}

/// Raw fields submitted by a presentation surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOverlay {
    pub recipient_name: String,
    pub payment_method: PaymentMethod,
    pub payment_identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_minutes: u32,
}

/// Published on every store mutation. `Expired` is the expiry notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum OverlayEvent {
    Created(Uuid),
    Activated(Uuid),
    Deactivated(Uuid),
    Deleted(Uuid),
    Expired(Uuid),
}

impl OverlayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayEvent::Created(_) => "created",
            OverlayEvent::Activated(_) => "activated",
            OverlayEvent::Deactivated(_) => "deactivated",
            OverlayEvent::Deleted(_) => "deleted",
            OverlayEvent::Expired(_) => "expired",
        }
    }
}

/// Answer from the auth collaborator for one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
}

impl Session {
    pub fn authenticated() -> Self {
        Self { authenticated: true }
    }

    pub fn anonymous() -> Self {
        Self { authenticated: false }
    }
}
