use serde::{Deserialize, Serialize};

/// Bank code for Mandiri; charged as a bill payment (`echannel`) instead of a VA
pub const MANDIRI: &str = "mandiri";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardOptions {
    pub secure: bool,
}

/// Body of `POST /snap/v1/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapRequest {
    pub transaction_details: TransactionDetails,
    pub customer_details: CustomerDetails,
    pub enabled_payments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCardOptions>,
}

impl SnapRequest {
    pub fn new(
        order_id: &str,
        amount: i64,
        name: &str,
        email: &str,
        enabled_payments: Vec<String>,
    ) -> Self {
        Self {
            transaction_details: TransactionDetails {
                order_id: order_id.to_string(),
                gross_amount: amount,
            },
            customer_details: CustomerDetails {
                first_name: name.to_string(),
                email: email.to_string(),
            },
            enabled_payments,
            credit_card: Some(CreditCardOptions { secure: true }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomExpiry {
    pub expiry_duration: u32,
    pub unit: String,
}

impl CustomExpiry {
    pub fn minutes(duration: u32) -> Self {
        Self {
            expiry_duration: duration,
            unit: "minute".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransferOptions {
    pub bank: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchannelOptions {
    pub bill_info1: String,
    pub bill_info2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletCallbackOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_callback: Option<bool>,
    pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrisOptions {
    pub acquirer: String,
}

/// Body of `POST /v2/charge`, scoped to one payment sub-method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub payment_type: String,
    pub transaction_details: TransactionDetails,
    pub customer_details: CustomerDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_transfer: Option<BankTransferOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echannel: Option<EchannelOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gopay: Option<WalletCallbackOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopeepay: Option<WalletCallbackOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qris: Option<QrisOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_expiry: Option<CustomExpiry>,
}

impl ChargeRequest {
    fn base(payment_type: &str, order_id: &str, amount: i64, name: &str, email: &str) -> Self {
        Self {
            payment_type: payment_type.to_string(),
            transaction_details: TransactionDetails {
                order_id: order_id.to_string(),
                gross_amount: amount,
            },
            customer_details: CustomerDetails {
                first_name: name.to_string(),
                email: email.to_string(),
            },
            bank_transfer: None,
            echannel: None,
            gopay: None,
            shopeepay: None,
            qris: None,
            custom_expiry: None,
        }
    }

    /// Virtual account transfer; Mandiri becomes an `echannel` bill payment
    pub fn bank_transfer(order_id: &str, amount: i64, name: &str, email: &str, bank: &str) -> Self {
        if bank == MANDIRI {
            let mut request = Self::base("echannel", order_id, amount, name, email);
            request.echannel = Some(EchannelOptions {
                bill_info1: "Payment:".to_string(),
                bill_info2: "Donation".to_string(),
            });
            return request;
        }

        let mut request = Self::base("bank_transfer", order_id, amount, name, email);
        request.bank_transfer = Some(BankTransferOptions {
            bank: bank.to_string(),
        });
        request
    }

    /// E-wallet charge with a 60 minute expiry.
    ///
    /// `callback_url` is where GoPay and ShopeePay send the donor back after
    /// paying in their app.
    pub fn ewallet(
        order_id: &str,
        amount: i64,
        name: &str,
        email: &str,
        wallet: &str,
        callback_url: Option<&str>,
    ) -> Self {
        let mut request = Self::base(wallet, order_id, amount, name, email);
        request.custom_expiry = Some(CustomExpiry::minutes(60));

        if let Some(url) = callback_url {
            match wallet {
                "gopay" => {
                    request.gopay = Some(WalletCallbackOptions {
                        enable_callback: Some(true),
                        callback_url: url.to_string(),
                    })
                }
                "shopeepay" => {
                    request.shopeepay = Some(WalletCallbackOptions {
                        enable_callback: None,
                        callback_url: url.to_string(),
                    })
                }
                _ => {}
            }
        }

        request
    }

    pub fn qris(order_id: &str, amount: i64, name: &str, email: &str) -> Self {
        let mut request = Self::base("qris", order_id, amount, name, email);
        request.qris = Some(QrisOptions {
            acquirer: "gopay".to_string(),
        });
        request.custom_expiry = Some(CustomExpiry::minutes(60));
        request
    }

    pub fn order_id(&self) -> &str {
        &self.transaction_details.order_id
    }
}

/// The two request shapes the gateway accepts
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Snap(SnapRequest),
    Charge(ChargeRequest),
}

impl GatewayCall {
    pub fn order_id(&self) -> &str {
        match self {
            GatewayCall::Snap(request) => &request.transaction_details.order_id,
            GatewayCall::Charge(request) => request.order_id(),
        }
    }
}
