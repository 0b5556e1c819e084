// Integration Tests: Webhook Handling
//
// Posts Midtrans notifications to /api/payment/webhook and checks the
// stored donation afterwards:
// - status mapping and payment details snapshot
// - HMAC-SHA512 signature enforcement
// - repeated deliveries are harmless
// - a late `pending` never overwrites a terminal status

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::test;
use donation_checkout::donations::PaymentStatus;
use helpers::*;
use serde_json::{json, Value};

const WEBHOOK_URI: &str = "/api/payment/webhook";

fn webhook_request(body: &Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(WEBHOOK_URI)
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string())
}

#[actix_web::test]
async fn test_settlement_marks_donation_paid() {
    let ctx = TestContext::new(ScriptedGateway::snap_ok());
    ctx.seed_donation("DONATION-1760000000000-1", 100_000).await;
    let app = test::init_service(ctx.app()).await;

    let payload = TestDataFactory::notification("DONATION-1760000000000-1", "settlement");
    let resp = test::call_service(&app, webhook_request(&payload).to_request()).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["order_id"], "DONATION-1760000000000-1");
    assert_eq!(body["status"], "success");
    assert_eq!(body["verified_status"], "success");

    let stored = ctx.stored("DONATION-1760000000000-1").await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Success);
    assert_eq!(stored.transaction_id.as_deref(), Some("trx-webhook-1"));
    assert_eq!(stored.payment_type.as_deref(), Some("bank_transfer"));
    assert!(stored.updated_at.is_some());

    let details = stored.payment_details_json();
    assert_eq!(details["transaction_status"], "settlement");
    assert_eq!(details["gross_amount"], "100000.00");
    assert!(details["webhook_received_at"].is_string());

    // The status endpoint shows the update
    let req = test::TestRequest::get()
        .uri("/api/payment?order_id=DONATION-1760000000000-1")
        .to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["status"], "success");
    assert_eq!(status["payment_details"]["status_code"], "200");
}

#[actix_web::test]
async fn test_status_mapping_through_webhook() {
    let ctx = TestContext::new(ScriptedGateway::snap_ok());
    let app = test::init_service(ctx.app()).await;

    let cases = [
        (TestDataFactory::notification("DONATION-1-1", "cancel"), PaymentStatus::Cancel),
        (TestDataFactory::notification("DONATION-1-2", "expire"), PaymentStatus::Expired),
        (TestDataFactory::notification("DONATION-1-3", "deny"), PaymentStatus::Deny),
        (TestDataFactory::notification("DONATION-1-4", "pending"), PaymentStatus::Pending),
        (TestDataFactory::notification("DONATION-1-5", "authorize"), PaymentStatus::Pending),
        (
            TestDataFactory::card_notification("DONATION-1-6", "capture", "accept"),
            PaymentStatus::Success,
        ),
        (
            TestDataFactory::card_notification("DONATION-1-7", "capture", "challenge"),
            PaymentStatus::Challenge,
        ),
    ];

    for (payload, expected) in cases {
        let order_id = payload["order_id"].as_str().unwrap().to_string();
        ctx.seed_donation(&order_id, 25_000).await;

        let resp = test::call_service(&app, webhook_request(&payload).to_request()).await;
        assert_eq!(resp.status(), 200, "{}", order_id);

        let stored = ctx.stored(&order_id).await.unwrap();
        assert_eq!(stored.payment_status, expected, "{}", order_id);
    }
}

#[actix_web::test]
async fn test_unknown_order_is_404_and_creates_nothing() {
    let ctx = TestContext::new(ScriptedGateway::snap_ok());
    let app = test::init_service(ctx.app()).await;

    let payload = TestDataFactory::notification("DONATION-404-1", "settlement");
    let resp = test::call_service(&app, webhook_request(&payload).to_request()).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Donation not found");
    assert_eq!(body["order_id"], "DONATION-404-1");
    assert!(ctx.repo.is_empty().await);
}

#[actix_web::test]
async fn test_malformed_notifications_are_400() {
    let ctx = TestContext::new(ScriptedGateway::snap_ok());
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::post()
        .uri(WEBHOOK_URI)
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid JSON payload");

    let payload = json!({ "transaction_status": "settlement" });
    let resp = test::call_service(&app, webhook_request(&payload).to_request()).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_unsigned_webhook_rejected_when_required() {
    let ctx = TestContext::with_signatures(ScriptedGateway::snap_ok());
    ctx.seed_donation("DONATION-2-1", 100_000).await;
    let app = test::init_service(ctx.app()).await;

    let payload = TestDataFactory::notification("DONATION-2-1", "settlement");
    let resp = test::call_service(&app, webhook_request(&payload).to_request()).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let stored = ctx.stored("DONATION-2-1").await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    assert!(stored.payment_details.is_none());
}

#[actix_web::test]
async fn test_wrong_signature_rejected() {
    let ctx = TestContext::with_signatures(ScriptedGateway::snap_ok());
    ctx.seed_donation("DONATION-2-2", 100_000).await;
    let app = test::init_service(ctx.app()).await;

    let payload = TestDataFactory::notification("DONATION-2-2", "settlement");
    let forged = ctx.sign(b"some other body");

    for signature in [forged.as_str(), "not-hex", "abcd"] {
        let req = webhook_request(&payload)
            .insert_header(("X-Signature-Key", signature))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{}", signature);
    }

    let stored = ctx.stored("DONATION-2-2").await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
}

#[actix_web::test]
async fn test_signed_webhook_accepted_under_each_header() {
    let ctx = TestContext::with_signatures(ScriptedGateway::snap_ok());
    let app = test::init_service(ctx.app()).await;

    let headers = [
        "X-Signature-Key",
        "X-Signature",
        "Signature-Key",
        "X-Callback-Signature",
    ];

    for (i, header) in headers.into_iter().enumerate() {
        let order_id = format!("DONATION-3-{}", i);
        ctx.seed_donation(&order_id, 100_000).await;

        let payload = TestDataFactory::notification(&order_id, "settlement");
        let raw = payload.to_string();
        let signature = ctx.sign(raw.as_bytes());

        let req = test::TestRequest::post()
            .uri(WEBHOOK_URI)
            .insert_header(("Content-Type", "application/json"))
            .insert_header((header, signature))
            .set_payload(raw)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "{}", header);

        let stored = ctx.stored(&order_id).await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Success);
    }
}

#[actix_web::test]
async fn test_duplicate_delivery_is_idempotent() {
    let ctx = TestContext::new(ScriptedGateway::snap_ok());
    ctx.seed_donation("DONATION-4-1", 100_000).await;
    let app = test::init_service(ctx.app()).await;

    let payload = TestDataFactory::notification("DONATION-4-1", "settlement");
    for _ in 0..2 {
        let resp = test::call_service(&app, webhook_request(&payload).to_request()).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["verified_status"], "success");
    }

    let stored = ctx.stored("DONATION-4-1").await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Success);
    assert_eq!(stored.transaction_id.as_deref(), Some("trx-webhook-1"));
    assert_eq!(ctx.repo.len().await, 1);
}

#[actix_web::test]
async fn test_late_pending_keeps_terminal_status() {
    let ctx = TestContext::new(ScriptedGateway::snap_ok());
    ctx.seed_donation("DONATION-5-1", 100_000).await;
    let app = test::init_service(ctx.app()).await;

    let settled = TestDataFactory::notification("DONATION-5-1", "settlement");
    let resp = test::call_service(&app, webhook_request(&settled).to_request()).await;
    assert_eq!(resp.status(), 200);

    let late = TestDataFactory::notification("DONATION-5-1", "pending");
    let resp = test::call_service(&app, webhook_request(&late).to_request()).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["verified_status"], "success");

    let stored = ctx.stored("DONATION-5-1").await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Success);
    // The snapshot still records the latest notification
    assert_eq!(stored.payment_details_json()["transaction_status"], "pending");
}

#[actix_web::test]
async fn test_webhook_reopens_failed_donation() {
    let ctx = TestContext::new(ScriptedGateway::failing());
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::post()
        .uri("/api/donation")
        .set_json(TestDataFactory::bank_transfer_donation("bca"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let order_id = ctx.gateway.calls()[0].order_id().to_string();
    assert_eq!(
        ctx.stored(&order_id).await.unwrap().payment_status,
        PaymentStatus::Failed
    );

    let payload = TestDataFactory::notification(&order_id, "settlement");
    let resp = test::call_service(&app, webhook_request(&payload).to_request()).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        ctx.stored(&order_id).await.unwrap().payment_status,
        PaymentStatus::Success
    );
}

#[actix_web::test]
async fn test_webhook_endpoint_is_alive() {
    let ctx = TestContext::with_signatures(ScriptedGateway::snap_ok());
    let app = test::init_service(ctx.app()).await;

    let req = test::TestRequest::get().uri(WEBHOOK_URI).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Midtrans webhook endpoint is active");
    assert_eq!(body["signature_required"], true);
}

#[cfg(not(feature = "sandbox"))]
#[actix_web::test]
async fn test_actions_ignored_without_sandbox() {
    let ctx = TestContext::new(ScriptedGateway::snap_ok());
    ctx.seed_donation("DONATION-6-1", 100_000).await;
    let app = test::init_service(ctx.app()).await;

    for action in ["success", "direct-update", "check"] {
        let req = test::TestRequest::get()
            .uri(&format!("{}?action={}&order_id=DONATION-6-1", WEBHOOK_URI, action))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    let stored = ctx.stored("DONATION-6-1").await.unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
}

#[cfg(feature = "sandbox")]
mod sandbox {
    use super::*;

    #[actix_web::test]
    async fn test_simulate_success() {
        let ctx = TestContext::new(ScriptedGateway::snap_ok());
        ctx.seed_donation("DONATION-7-1", 75_000).await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri(&format!("{}?action=success&order_id=DONATION-7-1", WEBHOOK_URI))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["webhook_response"]["verified_status"], "success");
        assert_eq!(body["payload"]["transaction_status"], "settlement");
        assert_eq!(body["payload"]["gross_amount"], 75_000);
        assert!(body["payload"]["transaction_id"]
            .as_str()
            .unwrap()
            .starts_with("sim-"));

        let stored = ctx.stored("DONATION-7-1").await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Success);
    }

    #[actix_web::test]
    async fn test_simulate_failed_maps_to_deny() {
        let ctx = TestContext::new(ScriptedGateway::snap_ok());
        ctx.seed_donation("DONATION-7-2", 75_000).await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri(&format!("{}?action=failed&order_id=DONATION-7-2", WEBHOOK_URI))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let stored = ctx.stored("DONATION-7-2").await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Deny);
    }

    #[actix_web::test]
    async fn test_check_and_direct_update() {
        let ctx = TestContext::new(ScriptedGateway::snap_ok());
        ctx.seed_donation("DONATION-7-3", 75_000).await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri(&format!("{}?action=check&order_id=DONATION-7-3", WEBHOOK_URI))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "pending");

        let req = test::TestRequest::get()
            .uri(&format!(
                "{}?action=direct-update&order_id=DONATION-7-3&status=expired",
                WEBHOOK_URI
            ))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["new_status"], "expired");

        // Direct updates skip the terminal guard
        let req = test::TestRequest::get()
            .uri(&format!(
                "{}?action=direct-update&order_id=DONATION-7-3&status=pending",
                WEBHOOK_URI
            ))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["new_status"], "pending");
    }

    #[actix_web::test]
    async fn test_direct_update_rejects_bad_status() {
        let ctx = TestContext::new(ScriptedGateway::snap_ok());
        ctx.seed_donation("DONATION-7-4", 75_000).await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri(&format!(
                "{}?action=direct-update&order_id=DONATION-7-4&status=paid",
                WEBHOOK_URI
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid status value");
    }

    #[actix_web::test]
    async fn test_actions_on_unknown_order() {
        let ctx = TestContext::new(ScriptedGateway::snap_ok());
        let app = test::init_service(ctx.app()).await;

        for action in ["check", "success", "direct-update"] {
            let req = test::TestRequest::get()
                .uri(&format!("{}?action={}&order_id=DONATION-0-0", WEBHOOK_URI, action))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 404, "{}", action);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["order_id"], "DONATION-0-0");
        }
        assert!(ctx.repo.is_empty().await);
    }

    #[actix_web::test]
    async fn test_unknown_action_is_400() {
        let ctx = TestContext::new(ScriptedGateway::snap_ok());
        ctx.seed_donation("DONATION-7-5", 75_000).await;
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri(&format!("{}?action=refund&order_id=DONATION-7-5", WEBHOOK_URI))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
