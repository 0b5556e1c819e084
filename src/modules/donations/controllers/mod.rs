pub mod donation_controller;

pub use donation_controller::configure;
