use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::donations::models::DonationRequest;
use crate::modules::donations::services::CheckoutService;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub order_id: Option<String>,
}

/// Snap checkout
/// POST /donation
pub async fn create_donation(
    service: web::Data<CheckoutService>,
    body: web::Json<DonationRequest>,
) -> Result<HttpResponse, AppError> {
    let response = service.donate(&body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Bank transfer through Snap, e-wallet through a direct charge
/// POST /payment
pub async fn create_payment(
    service: web::Data<CheckoutService>,
    body: web::Json<DonationRequest>,
) -> Result<HttpResponse, AppError> {
    let response = service.pay(&body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /paywithbanktf
pub async fn pay_with_bank_transfer(
    service: web::Data<CheckoutService>,
    body: web::Json<DonationRequest>,
) -> Result<HttpResponse, AppError> {
    let response = service.pay_with_bank_transfer(&body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /paywithewallet
pub async fn pay_with_ewallet(
    service: web::Data<CheckoutService>,
    body: web::Json<DonationRequest>,
) -> Result<HttpResponse, AppError> {
    let response = service.pay_with_ewallet(&body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /paywithqris
pub async fn pay_with_qris(
    service: web::Data<CheckoutService>,
    body: web::Json<DonationRequest>,
) -> Result<HttpResponse, AppError> {
    let response = service.pay_with_qris(&body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Current status of a donation, polled by the payment page
/// GET /payment?order_id= and GET /donation?order_id=
pub async fn get_status(
    service: web::Data<CheckoutService>,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, AppError> {
    let order_id = query
        .order_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("Missing order ID"))?;

    tracing::debug!(order_id = %order_id, "Status check");

    match service.status(order_id).await {
        Ok(status) => Ok(HttpResponse::Ok().json(status)),
        Err(AppError::NotFound(message)) => Ok(not_found(&message, order_id)),
        Err(e) => Err(e),
    }
}

/// 404 body that echoes the order id back
pub fn not_found(message: &str, order_id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "success": false,
        "error": message,
        "order_id": order_id,
    }))
}

/// Configure donation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/donation")
            .route(web::post().to(create_donation))
            .route(web::get().to(get_status)),
    )
    .service(
        web::resource("/payment")
            .route(web::post().to(create_payment))
            .route(web::get().to(get_status)),
    )
    .route("/paywithbanktf", web::post().to(pay_with_bank_transfer))
    .route("/paywithewallet", web::post().to(pay_with_ewallet))
    .route("/paywithqris", web::post().to(pay_with_qris));
}
