use crate::core::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Successful `snap/v1/transactions` answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapTransaction {
    pub token: String,
    pub redirect_url: String,
    /// Present only for some Snap configurations
    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaNumber {
    pub bank: String,
    pub va_number: String,
}

/// Link returned for e-wallet and QRIS charges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeAction {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// `v2/charge` answer; which fields are set depends on the payment type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeResponse {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,
    #[serde(default)]
    pub permata_va_number: Option<String>,
    #[serde(default)]
    pub bill_key: Option<String>,
    #[serde(default)]
    pub biller_code: Option<String>,
    #[serde(default)]
    pub actions: Vec<ChargeAction>,
    #[serde(default)]
    pub qr_string: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub deeplink_url: Option<String>,
    #[serde(default)]
    pub payment_code: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

impl ChargeResponse {
    /// Midtrans may answer HTTP 200 while reporting a failure in the body
    pub fn ensure_accepted(&self) -> Result<()> {
        match self.status_code.as_deref() {
            None => Ok(()),
            Some(code) if code.starts_with('2') => Ok(()),
            Some(code) => Err(AppError::gateway(format!(
                "Midtrans charge rejected - status {} ({})",
                code,
                self.status_message.as_deref().unwrap_or("no message")
            ))),
        }
    }

    /// URL of the first action whose name is in `names`
    pub fn action_url(&self, names: &[&str]) -> Option<&str> {
        self.actions
            .iter()
            .find(|action| names.contains(&action.name.as_str()))
            .map(|action| action.url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// Virtual account number for `bank`, falling back to the first entry
    pub fn va_number_for(&self, bank: &str) -> Option<&str> {
        self.va_numbers
            .iter()
            .find(|va| va.bank.eq_ignore_ascii_case(bank))
            .or_else(|| self.va_numbers.first())
            .map(|va| va.va_number.as_str())
            .filter(|va| !va.is_empty())
    }
}

/// Normalized result of one gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResponse {
    Snap(SnapTransaction),
    Charge(ChargeResponse),
}

impl GatewayResponse {
    pub fn as_charge(&self) -> Option<&ChargeResponse> {
        match self {
            GatewayResponse::Charge(charge) => Some(charge),
            GatewayResponse::Snap(_) => None,
        }
    }

    pub fn as_snap(&self) -> Option<&SnapTransaction> {
        match self {
            GatewayResponse::Snap(snap) => Some(snap),
            GatewayResponse::Charge(_) => None,
        }
    }
}
