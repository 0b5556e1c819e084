//! Donation checkout service
//!
//! Creates donation records, opens payments with Midtrans, and reconciles
//! their status from Midtrans webhooks.

pub mod app;
pub mod client;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use app::AppState;
pub use modules::donations;
pub use modules::gateways;
pub use modules::webhooks;
