// Test Application
//
// Builds the full route table over the in-memory donation store and a
// scripted gateway, for use with actix_web::test::init_service.

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::App;
use donation_checkout::donations::{
    Donation, DonationRepository, InMemoryDonationRepository, PaymentMethod,
};
use donation_checkout::donations::models::NewDonation;
use donation_checkout::gateways::PaymentGateway;
use donation_checkout::webhooks::SignatureVerifier;
use donation_checkout::AppState;
use std::sync::Arc;

use super::ScriptedGateway;

pub const TEST_SERVER_KEY: &str = "SB-Mid-server-test-key";
pub const TEST_PUBLIC_URL: &str = "http://localhost:3000";

pub struct TestContext {
    pub repo: Arc<InMemoryDonationRepository>,
    pub gateway: Arc<ScriptedGateway>,
    pub state: AppState,
}

impl TestContext {
    /// Signature checks off, as in development
    pub fn new(gateway: ScriptedGateway) -> Self {
        Self::build(gateway, false)
    }

    /// Signature checks on, as in production
    pub fn with_signatures(gateway: ScriptedGateway) -> Self {
        Self::build(gateway, true)
    }

    fn build(gateway: ScriptedGateway, require_signature: bool) -> Self {
        let repo = Arc::new(InMemoryDonationRepository::new());
        let gateway = Arc::new(gateway);

        let repository: Arc<dyn DonationRepository> = repo.clone();
        let payment_gateway: Arc<dyn PaymentGateway> = gateway.clone();
        let state = AppState::new(
            repository,
            payment_gateway,
            TEST_SERVER_KEY,
            require_signature,
            TEST_PUBLIC_URL,
        );

        Self {
            repo,
            gateway,
            state,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = self.state.clone();
        App::new().configure(move |cfg| state.configure(cfg))
    }

    /// Insert a pending donation directly, bypassing checkout
    pub async fn seed_donation(&self, order_id: &str, amount: i64) -> Donation {
        let donation = NewDonation::new(
            order_id.to_string(),
            "Budi".to_string(),
            "budi@example.com".to_string(),
            amount,
            PaymentMethod::BankTransfer,
            Some("bca".to_string()),
        )
        .unwrap();
        self.repo.insert(&donation).await.unwrap()
    }

    pub async fn stored(&self, order_id: &str) -> Option<Donation> {
        self.repo.find_by_order_id(order_id).await.unwrap()
    }

    /// Hex HMAC-SHA512 of `body` under the test server key
    pub fn sign(&self, body: &[u8]) -> String {
        SignatureVerifier::new(TEST_SERVER_KEY).sign(body).unwrap()
    }
}
