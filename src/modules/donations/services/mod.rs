pub mod checkout_service;
pub mod instructions;
pub mod order_id;

pub use checkout_service::CheckoutService;
pub use order_id::{generate_order_id, OrderPrefix};
