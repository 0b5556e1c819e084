use crate::modules::donations::models::PaymentStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Midtrans HTTP notification.
///
/// Only `order_id` is required; everything else is optional so an unusual
/// notification still reaches the status mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookNotification {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    /// Midtrans sends a string like "100000.00"; simulations send a number
    #[serde(default)]
    pub gross_amount: Option<Value>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
}

impl WebhookNotification {
    pub fn order_id(&self) -> Option<&str> {
        self.order_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// The fields kept on the donation as `payment_details`
    pub fn snapshot(&self) -> PaymentSnapshot {
        PaymentSnapshot {
            transaction_time: self.transaction_time.clone(),
            status_code: self.status_code.clone(),
            status_message: self.status_message.clone(),
            gross_amount: self.gross_amount.clone(),
            payment_type: self.payment_type.clone(),
            transaction_id: self.transaction_id.clone(),
            transaction_status: self.transaction_status.clone(),
            fraud_status: self.fraud_status.clone(),
            webhook_received_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub transaction_time: Option<String>,
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    pub gross_amount: Option<Value>,
    pub payment_type: Option<String>,
    pub transaction_id: Option<String>,
    pub transaction_status: Option<String>,
    pub fraud_status: Option<String>,
    pub webhook_received_at: String,
}

/// Result of applying one notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookOutcome {
    pub success: bool,
    pub order_id: String,
    /// Status the notification mapped to
    pub status: PaymentStatus,
    /// Status stored after the write
    pub verified_status: PaymentStatus,
}

/// Outcomes a sandbox simulation can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedAction {
    Success,
    Pending,
    Deny,
    Expire,
    Cancel,
}

impl SimulatedAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "success" => Some(SimulatedAction::Success),
            "pending" => Some(SimulatedAction::Pending),
            "deny" | "failed" => Some(SimulatedAction::Deny),
            "expire" | "expired" => Some(SimulatedAction::Expire),
            "cancel" => Some(SimulatedAction::Cancel),
            _ => None,
        }
    }

    /// Gateway `(transaction_status, fraud_status)` this action stands for
    pub fn gateway_statuses(&self) -> (&'static str, Option<&'static str>) {
        match self {
            SimulatedAction::Success => ("settlement", Some("accept")),
            SimulatedAction::Pending => ("pending", None),
            SimulatedAction::Deny => ("deny", None),
            SimulatedAction::Expire => ("expire", None),
            SimulatedAction::Cancel => ("cancel", None),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub success: bool,
    pub message: String,
    pub webhook_response: WebhookOutcome,
    pub payload: WebhookNotification,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectUpdateResult {
    pub success: bool,
    pub message: String,
    pub new_status: PaymentStatus,
}
