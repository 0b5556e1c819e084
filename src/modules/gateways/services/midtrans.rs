use super::gateway_trait::PaymentGateway;
use crate::config::MidtransConfig;
use crate::core::{AppError, Result};
use crate::modules::gateways::models::{
    ChargeRequest, ChargeResponse, SnapRequest, SnapTransaction,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Midtrans payment gateway client
///
/// Snap (`/snap/v1/transactions`) lives on the app host, the Core API
/// (`/v2/charge`) on the api host.
/// API Documentation: https://docs.midtrans.com/reference/api-reference
pub struct MidtransClient {
    client: Client,
    server_key: String,
    snap_base_url: String,
    api_base_url: String,
}

impl MidtransClient {
    /// Create a new Midtrans client
    ///
    /// # Arguments
    /// * `config` - Server key, hosts and request timeout
    pub fn new(config: &MidtransConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            server_key: config.server_key.clone(),
            snap_base_url: config.snap_base_url.trim_end_matches('/').to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.server_key, Some(""))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AppError::gateway(format!(
                        "Midtrans gateway unavailable: {} ({})",
                        if e.is_timeout() {
                            "timeout"
                        } else {
                            "connection failed"
                        },
                        e
                    ))
                } else {
                    AppError::gateway(format!("Midtrans API request failed: {}", e))
                }
            })?;

        let status_code = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| AppError::gateway(format!("Failed to read Midtrans response: {}", e)))?;

        if !status_code.is_success() {
            return Err(AppError::gateway(format!(
                "Midtrans API error - HTTP {} ({})",
                status_code.as_u16(),
                error_message(&response_body)
            )));
        }

        serde_json::from_str(&response_body).map_err(|e| {
            AppError::gateway_response(format!("Failed to parse Midtrans response: {}", e))
        })
    }
}

/// First human-readable message in a Midtrans error body
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.chars().take(200).collect();
    };

    value["error_messages"][0]
        .as_str()
        .or_else(|| value["status_message"].as_str())
        .or_else(|| value["message"].as_str())
        .unwrap_or("no message")
        .to_string()
}

#[async_trait]
impl PaymentGateway for MidtransClient {
    async fn create_snap_transaction(&self, request: &SnapRequest) -> Result<SnapTransaction> {
        let url = format!("{}/snap/v1/transactions", self.snap_base_url);

        tracing::debug!(
            order_id = %request.transaction_details.order_id,
            enabled_payments = ?request.enabled_payments,
            "Creating Snap transaction"
        );

        let transaction: SnapTransaction = self.post_json(&url, request).await?;
        if transaction.token.is_empty() {
            return Err(AppError::gateway_response("Snap response has an empty token"));
        }

        Ok(transaction)
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse> {
        let url = format!("{}/v2/charge", self.api_base_url);

        tracing::debug!(
            order_id = %request.order_id(),
            payment_type = %request.payment_type,
            "Creating charge"
        );

        let charge: ChargeResponse = self.post_json(&url, request).await?;
        charge.ensure_accepted()?;

        Ok(charge)
    }

    fn name(&self) -> &str {
        "midtrans"
    }
}
