pub mod auth;
pub mod metrics;
pub mod overlay_page;
pub mod overlays;
