use super::signature::SignatureVerifier;
use super::status_mapping::map_transaction_status;
use crate::core::{AppError, Result};
use crate::modules::donations::models::{Donation, DonationUpdate, PaymentStatus};
use crate::modules::donations::repositories::DonationRepository;
use crate::modules::webhooks::models::{
    DirectUpdateResult, SimulatedAction, SimulationResult, WebhookNotification, WebhookOutcome,
};
use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Applies gateway notifications to donation records.
///
/// The gateway retries failed deliveries on its own schedule; nothing here
/// retries.
#[derive(Clone)]
pub struct WebhookHandler {
    repository: Arc<dyn DonationRepository>,
    verifier: SignatureVerifier,
    require_signature: bool,
}

impl WebhookHandler {
    /// Create a new WebhookHandler
    ///
    /// # Arguments
    /// * `repository` - Donation store
    /// * `verifier` - Signature verifier keyed with the gateway server key
    /// * `require_signature` - Reject notifications without a valid signature
    pub fn new(
        repository: Arc<dyn DonationRepository>,
        verifier: SignatureVerifier,
        require_signature: bool,
    ) -> Self {
        Self {
            repository,
            verifier,
            require_signature,
        }
    }

    pub fn requires_signature(&self) -> bool {
        self.require_signature
    }

    /// Handle one delivery: verify, parse, then apply
    pub async fn handle(&self, raw_body: &[u8], signature: Option<&str>) -> Result<WebhookOutcome> {
        if self.require_signature {
            if let Err(e) = self.verifier.verify(raw_body, signature) {
                warn!(error = %e, has_signature = signature.is_some(), "Webhook rejected");
                return Err(e);
            }
        } else {
            info!("Webhook signature verification bypassed");
        }

        let notification: WebhookNotification = serde_json::from_slice(raw_body)
            .map_err(|_| AppError::validation("Invalid JSON payload"))?;

        self.apply(&notification).await
    }

    /// Map the notification and write it to the matching donation
    pub async fn apply(&self, notification: &WebhookNotification) -> Result<WebhookOutcome> {
        let order_id = notification
            .order_id()
            .ok_or_else(|| AppError::validation("Missing order_id"))?;

        let transaction_status = notification.transaction_status.as_deref().unwrap_or("");
        let status = map_transaction_status(transaction_status, notification.fraud_status.as_deref());

        info!(
            order_id = %order_id,
            transaction_status = %transaction_status,
            fraud_status = ?notification.fraud_status,
            mapped_status = %status,
            "Processing webhook"
        );

        let existing = self
            .repository
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| {
                error!(order_id = %order_id, "Webhook for unknown donation");
                AppError::not_found("Donation not found")
            })?;

        let payment_details = serde_json::to_string(&notification.snapshot())
            .map_err(|e| AppError::internal(format!("Failed to serialize payment details: {}", e)))?;

        let update = DonationUpdate {
            payment_status: Some(status),
            transaction_id: notification.transaction_id.clone(),
            payment_type: notification.payment_type.clone(),
            payment_details: Some(payment_details),
            keep_terminal_status: true,
        };
        let expected = update.resolve_status(existing.payment_status);

        if expected != status {
            warn!(
                order_id = %order_id,
                current_status = %existing.payment_status,
                mapped_status = %status,
                "Keeping terminal status"
            );
        }

        self.repository.update_by_order_id(order_id, &update).await?;

        let verified_status = self.verify_status(order_id, expected).await?;

        if verified_status == PaymentStatus::Success && existing.payment_status != PaymentStatus::Success {
            info!(order_id = %order_id, "Donation paid");
        }

        Ok(WebhookOutcome {
            success: true,
            order_id: order_id.to_string(),
            status,
            verified_status,
        })
    }

    /// Read-only lookup for the sandbox `check` action
    pub async fn check(&self, order_id: &str) -> Result<Donation> {
        self.repository
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donation not found"))
    }

    /// Set a status directly, skipping signature and mapping
    pub async fn direct_update(&self, order_id: &str, status: &str) -> Result<DirectUpdateResult> {
        let status = PaymentStatus::from_str(status)
            .map_err(|_| AppError::validation("Invalid status value"))?;

        self.check(order_id).await?;

        warn!(order_id = %order_id, status = %status, "Direct status update");
        self.repository
            .update_by_order_id(order_id, &DonationUpdate::status(status))
            .await?;

        let new_status = self.verify_status(order_id, status).await?;

        Ok(DirectUpdateResult {
            success: true,
            message: format!("Updated payment status to {}", status),
            new_status,
        })
    }

    /// Feed a synthesized notification through `apply`
    pub async fn simulate(&self, order_id: &str, action: &str) -> Result<SimulationResult> {
        let simulated = SimulatedAction::parse(action)
            .ok_or_else(|| AppError::validation("Invalid action"))?;
        let donation = self.check(order_id).await?;

        let (transaction_status, fraud_status) = simulated.gateway_statuses();
        let now = Utc::now();
        let payload = WebhookNotification {
            order_id: Some(order_id.to_string()),
            transaction_id: Some(format!("sim-{}", now.timestamp_millis())),
            transaction_status: Some(transaction_status.to_string()),
            fraud_status: fraud_status.map(str::to_string),
            payment_type: Some("simulation".to_string()),
            gross_amount: Some(donation.amount.into()),
            status_code: Some("200".to_string()),
            status_message: Some("Simulation".to_string()),
            transaction_time: Some(now.format("%Y-%m-%d %H:%M:%S").to_string()),
        };

        info!(order_id = %order_id, action = %action, "Simulating webhook");
        let webhook_response = self.apply(&payload).await?;

        Ok(SimulationResult {
            success: true,
            message: format!("Simulated {} for order {}", action, order_id),
            webhook_response,
            payload,
        })
    }

    /// Re-read the row and confirm the write landed
    async fn verify_status(&self, order_id: &str, expected: PaymentStatus) -> Result<PaymentStatus> {
        let stored = self
            .repository
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| {
                AppError::VerificationFailed(format!("Donation {} vanished after update", order_id))
            })?;

        if stored.payment_status != expected {
            error!(
                order_id = %order_id,
                expected = %expected,
                stored = %stored.payment_status,
                "Update verification failed"
            );
            return Err(AppError::VerificationFailed(format!(
                "Expected status {} for {}, found {}",
                expected, order_id, stored.payment_status
            )));
        }

        info!(order_id = %order_id, status = %stored.payment_status, "Donation status verified");
        Ok(stored.payment_status)
    }
}
