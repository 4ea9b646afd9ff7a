use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::services::overlay_service::OverlayService;
use crate::services::overlay_store::TickOutcome;

/// Periodic trigger that ticks the active overlay. Idles while nothing is on
/// screen and holds no overlay state of its own.
pub struct CountdownEngine {
    service: Arc<OverlayService>,
    period: Duration,
}

pub struct CountdownHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CountdownEngine {
    pub fn new(service: Arc<OverlayService>, period: Duration) -> Self {
        Self { service, period }
    }

    pub fn spawn(self) -> CountdownHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        CountdownHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Countdown engine started ({}ms period)", self.period.as_millis());

        loop {
            if !self.service.has_active() {
                debug!("Countdown idle");
                tokio::select! {
                    _ = self.service.activation() => continue,
                    _ = shutdown.changed() => break,
                }
            }

            tokio::select! {
                _ = sleep(self.period) => {
                    if let TickOutcome::Expired(id) = self.service.tick() {
                        debug!("Countdown observed expiry of {}", id);
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Countdown engine stopped");
    }
}

impl CountdownHandle {
    /// Stops the trigger and waits for the task, so no tick lands afterwards.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Countdown task ended abnormally: {}", e);
        }
    }
}
