use chrono::Utc;
use rand::Rng;

/// Order id namespace per checkout entry point.
///
/// Prefixes only help humans tell the routes apart in logs and the gateway
/// dashboard; nothing validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPrefix {
    Donation,
    BankTransfer,
    Ewallet,
    Qris,
}

impl OrderPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPrefix::Donation => "DONATION",
            OrderPrefix::BankTransfer => "BANKTF",
            OrderPrefix::Ewallet => "EWALLET",
            OrderPrefix::Qris => "QRIS",
        }
    }
}

/// `<PREFIX>-<epoch millis>-<0..999>`
///
/// Collisions are left to the unique key on `order_id`.
pub fn generate_order_id(prefix: OrderPrefix) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u16 = rand::rng().random_range(0..1000);
    format!("{}-{}-{}", prefix.as_str(), millis, suffix)
}
