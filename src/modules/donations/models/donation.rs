use crate::core::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Donation payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment
    #[default]
    Pending,
    Success,
    /// Gateway call failed before the donor could pay
    Failed,
    Expired,
    Cancel,
    Deny,
    /// Held for fraud review by the gateway
    Challenge,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 7] = [
        PaymentStatus::Pending,
        PaymentStatus::Success,
        PaymentStatus::Failed,
        PaymentStatus::Expired,
        PaymentStatus::Cancel,
        PaymentStatus::Deny,
        PaymentStatus::Challenge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Cancel => "cancel",
            PaymentStatus::Deny => "deny",
            PaymentStatus::Challenge => "challenge",
        }
    }

    /// Statuses normal gateway behaviour never moves away from.
    ///
    /// `failed` is set locally when the charge could not be created and is not
    /// part of this set.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Success
                | PaymentStatus::Deny
                | PaymentStatus::Expired
                | PaymentStatus::Cancel
                | PaymentStatus::Challenge
        )
    }

    /// Whether a client waiting on this donation can stop polling
    pub fn is_final(&self) -> bool {
        self.is_terminal() || *self == PaymentStatus::Failed
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid payment status: {}", s))
    }
}

/// Payment channel family stored with each donation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
    #[serde(alias = "e-wallet")]
    Ewallet,
    Cstore,
    Gopay,
    Shopeepay,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::Ewallet => "ewallet",
            PaymentMethod::Cstore => "cstore",
            PaymentMethod::Gopay => "gopay",
            PaymentMethod::Shopeepay => "shopeepay",
            PaymentMethod::Other => "other",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "credit-card" => Ok(PaymentMethod::CreditCard),
            "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            // The donation form submits "e-wallet"
            "ewallet" | "e-wallet" => Ok(PaymentMethod::Ewallet),
            "cstore" => Ok(PaymentMethod::Cstore),
            "gopay" => Ok(PaymentMethod::Gopay),
            "shopeepay" => Ok(PaymentMethod::Shopeepay),
            "other" => Ok(PaymentMethod::Other),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// One checkout attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Donation {
    pub id: i64,
    pub order_id: String,
    pub name: String,
    pub email: String,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_type: Option<String>,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    /// Serialized snapshot of the last webhook
    pub payment_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Donation {
    /// Parsed `payment_details`, or an empty object when absent or unreadable
    pub fn payment_details_json(&self) -> serde_json::Value {
        self.payment_details
            .as_deref()
            .and_then(|raw| match serde_json::from_str(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(order_id = %self.order_id, error = %e, "Unreadable payment details");
                    None
                }
            })
            .unwrap_or_else(|| serde_json::json!({}))
    }
}

/// Row shape as stored; enum columns are plain strings
#[derive(Debug, Clone, FromRow)]
pub struct DonationRow {
    pub id: i64,
    pub order_id: String,
    pub name: String,
    pub email: String,
    pub amount: i64,
    pub payment_method: String,
    pub payment_type: Option<String>,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub payment_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<DonationRow> for Donation {
    type Error = AppError;

    fn try_from(row: DonationRow) -> Result<Self> {
        Ok(Donation {
            payment_method: PaymentMethod::from_str(&row.payment_method)
                .map_err(AppError::Internal)?,
            payment_status: PaymentStatus::from_str(&row.payment_status)
                .map_err(AppError::Internal)?,
            id: row.id,
            order_id: row.order_id,
            name: row.name,
            email: row.email,
            amount: row.amount,
            payment_type: row.payment_type,
            transaction_id: row.transaction_id,
            payment_details: row.payment_details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Values for a fresh donation record; always starts `pending`
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub order_id: String,
    pub name: String,
    pub email: String,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_type: Option<String>,
}

impl NewDonation {
    pub fn new(
        order_id: String,
        name: String,
        email: String,
        amount: i64,
        payment_method: PaymentMethod,
        payment_type: Option<String>,
    ) -> Result<Self> {
        if order_id.trim().is_empty() {
            return Err(AppError::validation("Order ID cannot be empty"));
        }
        if amount <= 0 {
            return Err(AppError::validation("Amount must be a positive integer"));
        }

        Ok(Self {
            order_id,
            name,
            email,
            amount,
            payment_method,
            payment_type,
        })
    }
}

/// Partial update applied by order id. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationUpdate {
    pub payment_status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub payment_type: Option<String>,
    pub payment_details: Option<String>,
    /// A `pending` status never replaces a stored terminal status
    pub keep_terminal_status: bool,
}

impl DonationUpdate {
    pub fn status(status: PaymentStatus) -> Self {
        Self {
            payment_status: Some(status),
            ..Default::default()
        }
    }

    /// Status this update leaves behind when applied over `current`
    pub fn resolve_status(&self, current: PaymentStatus) -> PaymentStatus {
        match self.payment_status {
            None => current,
            Some(PaymentStatus::Pending) if self.keep_terminal_status && current.is_terminal() => {
                current
            }
            Some(next) => next,
        }
    }
}
