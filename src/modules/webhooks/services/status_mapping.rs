use crate::modules::donations::models::PaymentStatus;

/// Map a Midtrans `(transaction_status, fraud_status)` pair onto the
/// donation status.
///
/// Unknown transaction statuses map to `pending`.
pub fn map_transaction_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> PaymentStatus {
    match transaction_status {
        "capture" => match fraud_status {
            Some("accept") => PaymentStatus::Success,
            Some("challenge") => PaymentStatus::Challenge,
            _ => PaymentStatus::Pending,
        },
        "settlement" => PaymentStatus::Success,
        "deny" => PaymentStatus::Deny,
        "cancel" => PaymentStatus::Cancel,
        "expire" => PaymentStatus::Expired,
        "pending" => PaymentStatus::Pending,
        "refund" => PaymentStatus::Cancel,
        _ => PaymentStatus::Pending,
    }
}
