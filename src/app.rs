//! Route table and shared handler state

use actix_web::web;
use std::sync::Arc;

use crate::middleware::{json_error_handler, query_error_handler};
use crate::modules::donations::{CheckoutService, DonationRepository};
use crate::modules::gateways::PaymentGateway;
use crate::modules::webhooks::{SignatureVerifier, WebhookHandler};
use crate::modules::{donations, health, webhooks};

const JSON_LIMIT_BYTES: usize = 64 * 1024;

/// Services built once at start-up and shared by every worker
#[derive(Clone)]
pub struct AppState {
    repository: web::Data<Arc<dyn DonationRepository>>,
    checkout: web::Data<CheckoutService>,
    webhooks: web::Data<WebhookHandler>,
}

impl AppState {
    /// # Arguments
    /// * `repository` - Donation store
    /// * `gateway` - Payment gateway client
    /// * `server_key` - Gateway server key, also the webhook HMAC key
    /// * `require_signature` - Reject unsigned webhooks
    /// * `public_url` - Public site URL
    pub fn new(
        repository: Arc<dyn DonationRepository>,
        gateway: Arc<dyn PaymentGateway>,
        server_key: &str,
        require_signature: bool,
        public_url: &str,
    ) -> Self {
        let checkout = CheckoutService::new(repository.clone(), gateway, public_url.to_string());
        let webhooks = WebhookHandler::new(
            repository.clone(),
            SignatureVerifier::new(server_key),
            require_signature,
        );

        Self {
            repository: web::Data::new(repository),
            checkout: web::Data::new(checkout),
            webhooks: web::Data::new(webhooks),
        }
    }

    /// Health probes at the root, everything else under `/api`
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.repository.clone())
            .app_data(self.checkout.clone())
            .app_data(self.webhooks.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(JSON_LIMIT_BYTES)
                    .error_handler(json_error_handler),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(health::configure)
            .service(
                web::scope("/api")
                    .configure(webhooks::configure)
                    .configure(donations::configure),
            );
    }
}
