pub mod notification;

pub use notification::{
    DirectUpdateResult, PaymentSnapshot, SimulatedAction, SimulationResult, WebhookNotification,
    WebhookOutcome,
};
