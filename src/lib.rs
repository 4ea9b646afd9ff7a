//! Temporary on-screen donation overlays for streaming browser sources.

pub mod app;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
