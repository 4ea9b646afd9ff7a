pub mod atomic_metrics;
pub mod clock;
pub mod countdown;
pub mod overlay_service;
pub mod overlay_store;
pub mod payment_target;
pub mod renderer;
pub mod share_link;

pub use countdown::CountdownEngine;
pub use overlay_service::OverlayService;
pub use overlay_store::{OverlayStore, StorePolicy};
