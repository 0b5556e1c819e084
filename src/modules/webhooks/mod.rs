pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::configure;
pub use models::{WebhookNotification, WebhookOutcome};
pub use services::{map_transaction_status, SignatureVerifier, WebhookHandler};
