pub mod locale;
pub mod overlay;
pub mod payment;
