use super::super::models::{
    CheckoutResponse, Donation, DonationRequest, DonationStatusResponse, DonationUpdate, Donor,
    NewDonation, PaymentInstructions, PaymentMethod, PaymentStatus,
};
use super::super::repositories::DonationRepository;
use super::instructions;
use super::order_id::{generate_order_id, OrderPrefix};
use crate::core::{AppError, Result};
use crate::modules::gateways::models::{ChargeRequest, GatewayCall, GatewayResponse, SnapRequest};
use crate::modules::gateways::PaymentGateway;
use std::str::FromStr;
use std::sync::Arc;

const DEFAULT_BANK: &str = "bca";
const DEFAULT_WALLET: &str = "gopay";

/// How to turn the gateway answer into donor instructions
#[derive(Debug, Clone, PartialEq)]
enum Render {
    SnapBank(Option<String>),
    SnapEwallet(String),
    SnapPlain,
    BankCharge(String),
    EwalletCharge(String),
    QrisCharge,
}

/// One prepared checkout: the record to insert and the single gateway call
#[derive(Debug, Clone)]
struct Checkout {
    donation: NewDonation,
    call: GatewayCall,
    render: Render,
}

/// Checkout service for business logic
///
/// Inserts the pending donation, makes exactly one gateway call and shapes
/// the answer. A failed call marks the donation `failed` before the error is
/// returned.
pub struct CheckoutService {
    repository: Arc<dyn DonationRepository>,
    gateway: Arc<dyn PaymentGateway>,
    public_url: String,
}

impl CheckoutService {
    /// Create a new CheckoutService
    ///
    /// # Arguments
    /// * `repository` - Donation store
    /// * `gateway` - Payment gateway client
    /// * `public_url` - Public site URL, used for e-wallet return links
    pub fn new(
        repository: Arc<dyn DonationRepository>,
        gateway: Arc<dyn PaymentGateway>,
        public_url: String,
    ) -> Self {
        Self {
            repository,
            gateway,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Generic checkout through Snap; the channel narrows `enabled_payments`
    pub async fn donate(&self, request: &DonationRequest) -> Result<CheckoutResponse> {
        let donor = request.donor()?;
        let (channel, method) = required_method(request)?;
        let order_id = generate_order_id(OrderPrefix::Donation);

        let bank = request.bank_name()?;
        let wallet = request.ewallet_type()?;

        let (enabled_payments, render, payment_type) = match method {
            PaymentMethod::BankTransfer => match &bank {
                Some(code) => (
                    instructions::donation_bank_payments(code),
                    Render::SnapBank(Some(code.clone())),
                    Some(code.clone()),
                ),
                None => (
                    instructions::channel_default_payments(channel),
                    Render::SnapBank(None),
                    None,
                ),
            },
            PaymentMethod::Ewallet => match &wallet {
                Some(wallet) => (
                    vec![wallet.clone()],
                    Render::SnapEwallet(wallet.clone()),
                    Some(wallet.clone()),
                ),
                None => (
                    instructions::channel_default_payments(channel),
                    Render::SnapEwallet(String::new()),
                    None,
                ),
            },
            _ => (
                instructions::channel_default_payments(channel),
                Render::SnapPlain,
                None,
            ),
        };

        let checkout = Checkout {
            donation: new_donation(&order_id, &donor, method, payment_type)?,
            call: GatewayCall::Snap(SnapRequest::new(
                &order_id,
                donor.amount,
                &donor.name,
                &donor.email,
                enabled_payments,
            )),
            render,
        };

        self.run(checkout).await
    }

    /// Checkout where bank transfers go through Snap and e-wallets are
    /// charged directly
    pub async fn pay(&self, request: &DonationRequest) -> Result<CheckoutResponse> {
        let donor = request.donor()?;
        let (_, method) = required_method(request)?;
        let order_id = generate_order_id(OrderPrefix::Donation);

        let checkout = if method == PaymentMethod::Ewallet {
            let wallet = request
                .ewallet_type()?
                .unwrap_or_else(|| DEFAULT_WALLET.to_string());

            Checkout {
                donation: new_donation(&order_id, &donor, method, Some(wallet.clone()))?,
                call: GatewayCall::Charge(ChargeRequest::ewallet(
                    &order_id,
                    donor.amount,
                    &donor.name,
                    &donor.email,
                    &wallet,
                    None,
                )),
                render: Render::EwalletCharge(wallet),
            }
        } else {
            let bank = request.bank_name()?;
            let enabled_payments = match (&bank, method) {
                (Some(code), PaymentMethod::BankTransfer) => {
                    vec![instructions::snap_bank_payment(code).to_string()]
                }
                _ => instructions::channel_default_payments(""),
            };
            let render = if method == PaymentMethod::BankTransfer {
                Render::SnapBank(Some(bank.clone().unwrap_or_else(|| DEFAULT_BANK.to_string())))
            } else {
                Render::SnapPlain
            };

            Checkout {
                donation: new_donation(&order_id, &donor, method, bank)?,
                call: GatewayCall::Snap(SnapRequest::new(
                    &order_id,
                    donor.amount,
                    &donor.name,
                    &donor.email,
                    enabled_payments,
                )),
                render,
            }
        };

        self.run(checkout).await
    }

    /// Direct virtual account charge for one bank
    pub async fn pay_with_bank_transfer(
        &self,
        request: &DonationRequest,
    ) -> Result<CheckoutResponse> {
        let donor = request.donor()?;
        let bank = request
            .bank_name()?
            .ok_or_else(|| AppError::validation("Missing required fields"))?;
        let order_id = generate_order_id(OrderPrefix::BankTransfer);

        let checkout = Checkout {
            donation: new_donation(
                &order_id,
                &donor,
                PaymentMethod::BankTransfer,
                Some(bank.clone()),
            )?,
            call: GatewayCall::Charge(ChargeRequest::bank_transfer(
                &order_id,
                donor.amount,
                &donor.name,
                &donor.email,
                &bank,
            )),
            render: Render::BankCharge(bank),
        };

        self.run(checkout).await
    }

    /// Direct e-wallet charge; the donor is sent back to the site afterwards
    pub async fn pay_with_ewallet(&self, request: &DonationRequest) -> Result<CheckoutResponse> {
        let donor = request.donor()?;
        let wallet = request
            .ewallet_type()?
            .ok_or_else(|| AppError::validation("Missing required fields"))?;
        let order_id = generate_order_id(OrderPrefix::Ewallet);
        let callback_url = format!("{}/donate/success", self.public_url);

        let checkout = Checkout {
            donation: new_donation(
                &order_id,
                &donor,
                PaymentMethod::Ewallet,
                Some(wallet.clone()),
            )?,
            call: GatewayCall::Charge(ChargeRequest::ewallet(
                &order_id,
                donor.amount,
                &donor.name,
                &donor.email,
                &wallet,
                Some(&callback_url),
            )),
            render: Render::EwalletCharge(wallet),
        };

        self.run(checkout).await
    }

    /// Direct QRIS charge
    pub async fn pay_with_qris(&self, request: &DonationRequest) -> Result<CheckoutResponse> {
        let donor = request.donor()?;
        let order_id = generate_order_id(OrderPrefix::Qris);

        let checkout = Checkout {
            donation: new_donation(
                &order_id,
                &donor,
                PaymentMethod::Ewallet,
                Some("qris".to_string()),
            )?,
            call: GatewayCall::Charge(ChargeRequest::qris(
                &order_id,
                donor.amount,
                &donor.name,
                &donor.email,
            )),
            render: Render::QrisCharge,
        };

        self.run(checkout).await
    }

    /// Current state of a donation
    pub async fn status(&self, order_id: &str) -> Result<DonationStatusResponse> {
        let donation = self.find(order_id).await?;
        Ok(DonationStatusResponse::from(&donation))
    }

    pub async fn find(&self, order_id: &str) -> Result<Donation> {
        self.repository
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Donation not found"))
    }

    async fn run(&self, checkout: Checkout) -> Result<CheckoutResponse> {
        let order_id = checkout.donation.order_id.clone();

        self.repository.insert(&checkout.donation).await?;
        tracing::info!(
            order_id = %order_id,
            amount = checkout.donation.amount,
            payment_method = %checkout.donation.payment_method,
            "Donation created"
        );

        let response = match self.gateway.execute(&checkout.call).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    gateway = self.gateway.name(),
                    error = %e,
                    "Gateway call failed"
                );
                self.mark_failed(&order_id).await;
                return Err(e);
            }
        };

        let payment_instructions = match render(&checkout.render, &response) {
            Ok(instructions) => instructions,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Unusable gateway response");
                self.mark_failed(&order_id).await;
                return Err(e);
            }
        };

        let mut checkout_response = CheckoutResponse {
            success: true,
            order_id: order_id.clone(),
            payment_instructions,
            token: None,
            redirect_url: None,
            transaction_id: None,
            status_code: None,
            transaction_status: None,
        };

        match response {
            GatewayResponse::Snap(snap) => {
                checkout_response.token = Some(snap.token);
                checkout_response.redirect_url = Some(snap.redirect_url);
            }
            GatewayResponse::Charge(charge) => {
                if let Some(transaction_id) = &charge.transaction_id {
                    self.record_transaction_id(&order_id, transaction_id).await;
                }
                checkout_response.transaction_id = charge.transaction_id;
                checkout_response.status_code = charge.status_code;
                checkout_response.transaction_status = Some(
                    charge
                        .transaction_status
                        .unwrap_or_else(|| PaymentStatus::Pending.to_string()),
                );
            }
        }

        tracing::info!(order_id = %order_id, "Checkout completed");
        Ok(checkout_response)
    }

    /// Best effort; the gateway error is what the caller sees
    async fn mark_failed(&self, order_id: &str) {
        match self
            .repository
            .update_by_order_id(order_id, &DonationUpdate::status(PaymentStatus::Failed))
            .await
        {
            Ok(0) => tracing::warn!(order_id = %order_id, "No donation to mark as failed"),
            Ok(_) => tracing::info!(order_id = %order_id, "Donation marked as failed"),
            Err(e) => tracing::error!(
                order_id = %order_id,
                error = %e,
                "Failed to mark donation as failed"
            ),
        }
    }

    async fn record_transaction_id(&self, order_id: &str, transaction_id: &str) {
        let update = DonationUpdate {
            transaction_id: Some(transaction_id.to_string()),
            ..Default::default()
        };
        if let Err(e) = self.repository.update_by_order_id(order_id, &update).await {
            tracing::warn!(order_id = %order_id, error = %e, "Failed to store transaction id");
        }
    }
}

fn required_method(request: &DonationRequest) -> Result<(&str, PaymentMethod)> {
    let channel = request
        .payment_method()
        .ok_or_else(|| AppError::validation("Missing required fields"))?;
    let method = PaymentMethod::from_str(channel).map_err(AppError::Validation)?;
    Ok((channel, method))
}

fn new_donation(
    order_id: &str,
    donor: &Donor,
    method: PaymentMethod,
    payment_type: Option<String>,
) -> Result<NewDonation> {
    NewDonation::new(
        order_id.to_string(),
        donor.name.clone(),
        donor.email.clone(),
        donor.amount,
        method,
        payment_type,
    )
}

fn render(render: &Render, response: &GatewayResponse) -> Result<Option<PaymentInstructions>> {
    let unexpected = || AppError::gateway_response("Gateway answered with the wrong shape");

    let rendered = match render {
        Render::SnapBank(code) => {
            let snap = response.as_snap().ok_or_else(unexpected)?;
            Some(instructions::for_snap_bank(code.as_deref(), snap))
        }
        Render::SnapEwallet(wallet) => {
            response.as_snap().ok_or_else(unexpected)?;
            Some(instructions::for_snap_ewallet(wallet))
        }
        Render::SnapPlain => {
            response.as_snap().ok_or_else(unexpected)?;
            None
        }
        Render::BankCharge(code) => {
            let charge = response.as_charge().ok_or_else(unexpected)?;
            Some(instructions::for_bank_charge(code, charge)?)
        }
        Render::EwalletCharge(wallet) => {
            let charge = response.as_charge().ok_or_else(unexpected)?;
            Some(instructions::for_ewallet_charge(wallet, charge)?)
        }
        Render::QrisCharge => {
            let charge = response.as_charge().ok_or_else(unexpected)?;
            Some(instructions::for_qris_charge(charge)?)
        }
    };

    Ok(rendered)
}
