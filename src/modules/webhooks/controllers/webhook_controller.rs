use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::donations::controllers::donation_controller::not_found;
use crate::modules::webhooks::services::{extract_signature, WebhookHandler};

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub action: Option<String>,
    pub order_id: Option<String>,
    pub status: Option<String>,
}

/// Receive a gateway notification
/// POST /payment/webhook
///
/// The signature is computed over the raw body, so the body is taken as
/// bytes and parsed afterwards.
pub async fn receive_webhook(
    handler: web::Data<WebhookHandler>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = extract_signature(req.headers());

    match handler.handle(&body, signature).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(AppError::NotFound(message)) => {
            let order_id = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["order_id"].as_str().map(str::to_string))
                .unwrap_or_default();
            Ok(not_found(&message, &order_id))
        }
        Err(e) => Err(e),
    }
}

/// Liveness probe for the webhook URL, plus sandbox actions when built with
/// the `sandbox` feature
/// GET /payment/webhook
pub async fn webhook_actions(
    handler: web::Data<WebhookHandler>,
    query: web::Query<WebhookQuery>,
) -> Result<HttpResponse, AppError> {
    #[cfg(feature = "sandbox")]
    if let (Some(action), Some(order_id)) = (query.action.as_deref(), query.order_id.as_deref()) {
        return sandbox_action(&handler, action, order_id, query.status.as_deref()).await;
    }

    #[cfg(not(feature = "sandbox"))]
    if query.action.is_some() {
        tracing::warn!(action = ?query.action, "Sandbox webhook action requested but not enabled");
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Midtrans webhook endpoint is active",
        "signature_required": handler.requires_signature(),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

#[cfg(feature = "sandbox")]
async fn sandbox_action(
    handler: &WebhookHandler,
    action: &str,
    order_id: &str,
    status: Option<&str>,
) -> Result<HttpResponse, AppError> {
    use crate::modules::donations::models::DonationStatusResponse;

    let result = match action {
        "check" => handler.check(order_id).await.map(|donation| {
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": format!("Payment status for order {}", order_id),
                "data": DonationStatusResponse::from(&donation),
            }))
        }),
        "direct-update" => handler
            .direct_update(order_id, status.unwrap_or("success"))
            .await
            .map(|result| HttpResponse::Ok().json(result)),
        _ => handler
            .simulate(order_id, action)
            .await
            .map(|result| HttpResponse::Ok().json(result)),
    };

    match result {
        Err(AppError::NotFound(message)) => Ok(not_found(&message, order_id)),
        other => other,
    }
}

/// Configure webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/payment/webhook")
            .route(web::post().to(receive_webhook))
            .route(web::get().to(webhook_actions)),
    );
}
