//! Admin API tests: distributors, order workflow, quotes and statistics.
//!
//! These tests require:
//! - A migrated and seeded database
//! - Both servers running (orders and quotes are placed on the storefront)
//!
//! Run with: cargo test -p distrimart-integration-tests -- --ignored --test-threads=1

use distrimart_integration_tests::{TestContext, decimal, expect_json, id_of};
use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

async fn place_order(ctx: &TestContext, product_id: i64, quantity: u32) -> Value {
    expect_json(
        ctx.storefront(Method::POST, "/api/checkout")
            .json(&json!({
                "customer_email": "ops@example.com",
                "customer_name": "Ops Buyer",
                "lines": [{ "product_id": product_id, "quantity": quantity }],
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await
}

async fn set_order_status(ctx: &TestContext, order_id: i64, status: &str) -> reqwest::Response {
    ctx.admin(Method::PUT, &format!("/api/orders/{order_id}/status"))
        .json(&json!({ "status": status, "note": format!("moved to {status}") }))
        .send()
        .await
        .unwrap()
}

async fn stats(ctx: &TestContext) -> Value {
    expect_json(
        ctx.admin(Method::GET, "/api/stats").send().await.unwrap(),
        StatusCode::OK,
    )
    .await
}

fn status_count(stats: &Value, status: &str) -> i64 {
    stats["orders_by_status"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["status"] == status)
        .and_then(|entry| entry["count"].as_i64())
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_stats_lists_every_order_status() {
    let ctx = TestContext::new();
    let stats = stats(&ctx).await;

    let statuses: Vec<&str> = stats["orders_by_status"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["status"].as_str())
        .collect();
    assert_eq!(
        statuses,
        ["pending", "confirmed", "processing", "shipped", "delivered", "cancelled"]
    );
    assert!(decimal(&stats["revenue"]) >= Decimal::ZERO);
    assert!(stats["computed_at"].is_string());
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_distributor_lifecycle() {
    let ctx = TestContext::new();
    let before = stats(&ctx).await["distributors"].as_i64().unwrap();

    let created = ctx
        .create_distributor(
            "Lifecycle",
            json!({ "logo_url": "https://cdn.example.com/logo.png", "default_discount": "7.5" }),
        )
        .await;
    let id = id_of(&created);
    assert_eq!(decimal(&created["default_discount"]), Decimal::new(75, 1));

    // Writes invalidate the cached statistics.
    let after = stats(&ctx).await["distributors"].as_i64().unwrap();
    assert_eq!(after, before + 1);

    let patched = expect_json(
        ctx.admin(Method::PATCH, &format!("/api/distributors/{id}"))
            .json(&json!({ "logo_url": null, "brand_color": "#ABC" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(patched["logo_url"].is_null());
    assert_eq!(patched["brand_color"], "#abc");
    assert_eq!(patched["name"], created["name"]);

    let detail = expect_json(
        ctx.admin(Method::GET, &format!("/api/distributors/{id}"))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(detail["domains"].as_array().unwrap().is_empty());

    let duplicate = ctx
        .admin(Method::POST, "/api/distributors")
        .json(&json!({ "name": "Copycat", "email_domain": created["email_domain"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let deleted = ctx
        .admin(Method::DELETE, &format!("/api/distributors/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = ctx
        .admin(Method::GET, &format!("/api/distributors/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and seeded catalog"]
async fn test_order_status_workflow() {
    let ctx = TestContext::new();
    let product = ctx.any_product().await;
    let order = place_order(&ctx, id_of(&product), 2).await;
    let order_id = id_of(&order);

    let skipped = set_order_status(&ctx, order_id, "shipped").await;
    assert_eq!(skipped.status(), StatusCode::CONFLICT);

    for status in ["confirmed", "processing", "shipped", "delivered"] {
        let response = set_order_status(&ctx, order_id, status).await;
        let updated = expect_json(response, StatusCode::OK).await;
        assert_eq!(updated["status"], status);
    }

    let detail = expect_json(
        ctx.admin(Method::GET, &format!("/api/orders/{order_id}"))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    let history = detail["history"].as_array().unwrap();
    assert_eq!(history.len(), 5);
    assert!(history[0]["from_status"].is_null());
    assert_eq!(history[4]["from_status"], "shipped");
    assert_eq!(history[4]["to_status"], "delivered");
    assert_eq!(history[4]["note"], "moved to delivered");

    let reopened = set_order_status(&ctx, order_id, "pending").await;
    assert_eq!(reopened.status(), StatusCode::CONFLICT);

    let delivered = expect_json(
        ctx.admin(Method::GET, "/api/orders?status=delivered")
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(
        delivered
            .as_array()
            .unwrap()
            .iter()
            .any(|o| id_of(o) == order_id)
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and seeded catalog"]
async fn test_cancelled_orders_leave_revenue() {
    let ctx = TestContext::new();
    let product = ctx.any_product().await;
    let order = place_order(&ctx, id_of(&product), 1).await;
    let order_id = id_of(&order);

    // Storefront checkouts do not touch the admin cache; any admin write does.
    let response = set_order_status(&ctx, order_id, "confirmed").await;
    expect_json(response, StatusCode::OK).await;

    let before = stats(&ctx).await;
    let cancelled_before = status_count(&before, "cancelled");

    let response = set_order_status(&ctx, order_id, "cancelled").await;
    expect_json(response, StatusCode::OK).await;

    let after = stats(&ctx).await;
    assert_eq!(status_count(&after, "cancelled"), cancelled_before + 1);
    assert_eq!(
        decimal(&after["revenue"]),
        decimal(&before["revenue"]) - decimal(&order["subtotal"])
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and seeded catalog"]
async fn test_quote_conversion() {
    let ctx = TestContext::new();
    let product = ctx.any_product().await;
    let product_id = id_of(&product);

    let quote = expect_json(
        ctx.storefront(Method::POST, "/api/quotes")
            .json(&json!({
                "customer_email": "procurement@example.com",
                "customer_name": "Procurement",
                "company": "Example Corp",
                "message": "Need a volume price",
                "items": [{ "product_id": product_id, "quantity": 4 }],
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;
    let quote_id = id_of(&quote);
    assert_eq!(quote["status"], "pending");
    assert!(quote["items"][0]["quoted_unit_price"].is_null());

    let pending = expect_json(
        ctx.admin(Method::GET, "/api/quotes?status=pending")
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(pending.as_array().unwrap().iter().any(|q| id_of(q) == quote_id));

    let converted_directly = ctx
        .admin(Method::PUT, &format!("/api/quotes/{quote_id}/status"))
        .json(&json!({ "status": "converted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(converted_directly.status(), StatusCode::BAD_REQUEST);

    let order = expect_json(
        ctx.admin(Method::POST, &format!("/api/quotes/{quote_id}/convert"))
            .json(&json!({ "note": "agreed by phone" }))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["quote_id"], quote["id"]);
    assert_eq!(order["items"][0]["quantity"], 4);
    assert_eq!(order["customer_email"], "procurement@example.com");

    let after = expect_json(
        ctx.admin(Method::GET, &format!("/api/quotes/{quote_id}"))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(after["status"], "converted");
    assert_eq!(after["order_id"], order["id"]);

    let again = ctx
        .admin(Method::POST, &format!("/api/quotes/{quote_id}/convert"))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and seeded catalog"]
async fn test_agreed_quote_price_carries_into_order() {
    let ctx = TestContext::new();
    let product = ctx.any_product().await;
    let product_id = id_of(&product);

    let quote = expect_json(
        ctx.storefront(Method::POST, "/api/quotes")
            .json(&json!({
                "customer_email": "buyer@example.com",
                "customer_name": "Buyer",
                "items": [{ "product_id": product_id, "quantity": 3 }],
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;
    let quote_id = id_of(&quote);

    let unknown_item = ctx
        .admin(Method::PUT, &format!("/api/quotes/{quote_id}/status"))
        .json(&json!({
            "status": "quoted",
            "items": [{ "product_id": i64::MAX, "quoted_unit_price": "1.00" }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_item.status(), StatusCode::CONFLICT);

    let quoted = expect_json(
        ctx.admin(Method::PUT, &format!("/api/quotes/{quote_id}/status"))
            .json(&json!({
                "status": "quoted",
                "items": [{ "product_id": product_id, "quoted_unit_price": "1.23" }],
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(quoted["status"], "quoted");
    assert_eq!(decimal(&quoted["items"][0]["quoted_unit_price"]), Decimal::new(123, 2));

    let order = expect_json(
        ctx.admin(Method::POST, &format!("/api/quotes/{quote_id}/convert"))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;
    let item = &order["items"][0];
    assert_eq!(item["price_source"], "quoted");
    assert_eq!(decimal(&item["unit_price"]), Decimal::new(123, 2));
    assert_eq!(decimal(&item["line_total"]), Decimal::new(369, 2));
    assert_eq!(decimal(&order["subtotal"]), Decimal::new(369, 2));
}
