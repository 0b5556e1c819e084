pub mod signature;
pub mod status_mapping;
pub mod webhook_handler;

pub use signature::{extract_signature, SignatureVerifier, SIGNATURE_HEADERS};
pub use status_mapping::map_transaction_status;
pub use webhook_handler::WebhookHandler;
