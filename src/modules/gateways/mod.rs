pub mod models;
pub mod services;

pub use models::{ChargeRequest, ChargeResponse, GatewayCall, GatewayResponse, SnapRequest, SnapTransaction};
pub use services::{MidtransClient, PaymentGateway};
