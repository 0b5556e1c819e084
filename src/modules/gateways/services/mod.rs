pub mod gateway_trait;
pub mod midtrans;

pub use gateway_trait::PaymentGateway;
pub use midtrans::MidtransClient;
