pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use models::{Donation, DonationRequest, PaymentMethod, PaymentStatus};
pub use repositories::{DonationRepository, InMemoryDonationRepository, MySqlDonationRepository};
pub use services::CheckoutService;
