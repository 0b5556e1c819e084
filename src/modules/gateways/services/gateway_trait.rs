use crate::core::Result;
use crate::modules::gateways::models::{
    ChargeRequest, ChargeResponse, GatewayCall, GatewayResponse, SnapRequest, SnapTransaction,
};
use async_trait::async_trait;

/// Payment gateway used by checkout
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted-page transaction and return its token
    async fn create_snap_transaction(&self, request: &SnapRequest) -> Result<SnapTransaction>;

    /// Create a transaction for exactly one payment sub-method
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse>;

    /// Get gateway name
    fn name(&self) -> &str;

    /// Send one call of either shape
    async fn execute(&self, call: &GatewayCall) -> Result<GatewayResponse> {
        match call {
            GatewayCall::Snap(request) => self
                .create_snap_transaction(request)
                .await
                .map(GatewayResponse::Snap),
            GatewayCall::Charge(request) => self.charge(request).await.map(GatewayResponse::Charge),
        }
    }
}
