pub mod request;
pub mod response;

pub use request::{
    ChargeRequest, CustomExpiry, CustomerDetails, GatewayCall, SnapRequest, TransactionDetails,
    MANDIRI,
};
pub use response::{ChargeAction, ChargeResponse, GatewayResponse, SnapTransaction, VaNumber};
