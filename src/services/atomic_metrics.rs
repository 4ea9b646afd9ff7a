use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct AtomicMetrics {
    created: AtomicU64,
    activated: AtomicU64,
    deactivated: AtomicU64,
    deleted: AtomicU64,
    expired: AtomicU64,
    ticks: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub created: u64,
    pub activated: u64,
    pub deactivated: u64,
    pub deleted: u64,
    pub expired: u64,
    pub ticks: u64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_activated(&self) {
        self.activated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deactivated(&self) {
        self.deactivated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            activated: self.activated.load(Ordering::Relaxed),
            deactivated: self.deactivated.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
        }
    }
}
