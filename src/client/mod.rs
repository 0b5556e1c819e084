//! Helpers for programs that wait on a donation, such as the payment page
//! backend or an operator script.

pub mod status_poller;

pub use status_poller::{
    HttpStatusSource, PollOutcome, StatusPoller, StatusSource, DEFAULT_INTERVAL,
    DEFAULT_MAX_DURATION, MIN_INTERVAL,
};
