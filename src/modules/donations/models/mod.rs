pub mod checkout;
pub mod donation;

pub use checkout::{
    CheckoutResponse, DonationRequest, DonationStatusResponse, Donor, PaymentInstructions,
};
pub use donation::{
    Donation, DonationRow, DonationUpdate, NewDonation, PaymentMethod, PaymentStatus,
};
