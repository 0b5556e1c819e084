pub mod donations;
pub mod gateways;
pub mod health;
pub mod webhooks;
