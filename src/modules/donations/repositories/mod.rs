pub mod donation_repository;
pub mod memory;

pub use donation_repository::{DonationRepository, MySqlDonationRepository};
pub use memory::InMemoryDonationRepository;
