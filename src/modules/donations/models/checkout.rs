use super::donation::{Donation, PaymentStatus};
use crate::core::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Width of the `email` column
pub const MAX_EMAIL_LEN: usize = 256;
/// Width of the `payment_type` column, which stores bank and wallet codes
pub const MAX_CODE_LEN: usize = 32;

/// Donation form submission
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub amount: Option<i64>,
    pub payment_method: Option<String>,
    pub bank_name: Option<String>,
    pub ewallet_type: Option<String>,
}

/// Donor fields every checkout needs, validated
#[derive(Debug, Clone, PartialEq)]
pub struct Donor {
    pub name: String,
    pub email: String,
    pub amount: i64,
}

impl DonationRequest {
    /// Check name, email and amount; every entry point requires them
    pub fn donor(&self) -> Result<Donor> {
        let name = non_blank(self.name.as_deref());
        let email = non_blank(self.email.as_deref());

        match (name, email, self.amount) {
            (Some(name), Some(email), Some(amount)) => {
                if amount <= 0 {
                    return Err(AppError::validation("Amount must be a positive integer"));
                }
                if !email.contains('@') || email.chars().count() > MAX_EMAIL_LEN {
                    return Err(AppError::validation("Invalid email address"));
                }
                Ok(Donor {
                    name: name.to_string(),
                    email: email.to_string(),
                    amount,
                })
            }
            _ => Err(AppError::validation("Missing required fields")),
        }
    }

    pub fn payment_method(&self) -> Option<&str> {
        non_blank(self.payment_method.as_deref())
    }

    pub fn bank_name(&self) -> Result<Option<String>> {
        code(self.bank_name.as_deref(), "Invalid bank name")
    }

    pub fn ewallet_type(&self) -> Result<Option<String>> {
        code(self.ewallet_type.as_deref(), "Invalid e-wallet type")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Lower-cased channel code, bounded by the column it is stored in
fn code(value: Option<&str>, message: &str) -> Result<Option<String>> {
    match non_blank(value) {
        Some(code) if code.chars().count() > MAX_CODE_LEN => Err(AppError::validation(message)),
        Some(code) => Ok(Some(code.to_ascii_lowercase())),
        None => Ok(None),
    }
}

/// What the donor needs to complete the payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInstructions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub va_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deeplink_url: Option<String>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<String>,
}

/// Successful checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order_id: String,
    pub payment_instructions: Option<PaymentInstructions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<String>,
}

/// Status-check projection of a donation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationStatusResponse {
    pub success: bool,
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub status: PaymentStatus,
    pub amount: i64,
    /// Same value as `status`, named the way Midtrans clients expect
    pub transaction_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub payment_method: String,
    pub payment_type: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub payment_details: serde_json::Value,
    pub email: String,
    pub name: String,
}

impl From<&Donation> for DonationStatusResponse {
    fn from(donation: &Donation) -> Self {
        Self {
            success: true,
            order_id: donation.order_id.clone(),
            status: donation.payment_status,
            amount: donation.amount,
            transaction_status: donation.payment_status,
            transaction_id: donation.transaction_id.clone(),
            payment_method: donation.payment_method.to_string(),
            payment_type: donation.payment_type.clone(),
            updated_at: donation.updated_at,
            created_at: donation.created_at,
            payment_details: donation.payment_details_json(),
            email: donation.email.clone(),
            name: donation.name.clone(),
        }
    }
}
