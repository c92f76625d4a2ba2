//! Tenant resolution and per-tenant pricing, end to end.
//!
//! Rules are written through the admin API and observed through the
//! storefront, which resolves the tenant from the `Host` header.
//!
//! These tests require:
//! - A migrated and seeded database
//! - Both servers running
//!
//! Run with: cargo test -p distrimart-integration-tests -- --ignored

use distrimart_core::round_money;
use distrimart_integration_tests::{TestContext, decimal, expect_json, id_of};
use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

async fn tenant_for(ctx: &TestContext, host: &str) -> Value {
    let response = ctx
        .storefront_as(host, Method::GET, "/api/tenant")
        .send()
        .await
        .unwrap();
    expect_json(response, StatusCode::OK).await
}

async fn product_as(ctx: &TestContext, host: &str, product_id: i64, quantity: u32) -> Value {
    let response = ctx
        .storefront_as(
            host,
            Method::GET,
            &format!("/api/products/{product_id}?quantity={quantity}"),
        )
        .send()
        .await
        .unwrap();
    expect_json(response, StatusCode::OK).await
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_email_domain_host_resolves_tenant() {
    let ctx = TestContext::new();
    let distributor = ctx
        .create_distributor("Email Host", json!({ "brand_color": "#123abc" }))
        .await;
    let host = distributor["email_domain"].as_str().unwrap();

    let tenant = tenant_for(&ctx, host).await;
    assert_eq!(tenant["id"], distributor["id"]);
    assert_eq!(tenant["matched_by"], "email_domain");
    assert_eq!(tenant["brand_color"], "#123abc");

    let www = tenant_for(&ctx, &format!("WWW.{}:443", host.to_uppercase())).await;
    assert_eq!(www["id"], distributor["id"]);

    ctx.delete_distributor(id_of(&distributor)).await;
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_custom_domain_resolves_only_when_verified() {
    let ctx = TestContext::new();
    let distributor = ctx.create_distributor("Custom Domain", json!({})).await;
    let id = id_of(&distributor);
    let custom = format!("shop-{id}.custom-distrimart.net");

    let domain = expect_json(
        ctx.admin(Method::POST, &format!("/api/distributors/{id}/domains"))
            .json(&json!({ "domain": custom.to_uppercase() }))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(domain["domain"], custom);
    assert_eq!(domain["status"], "pending");

    assert!(tenant_for(&ctx, &custom).await.is_null());

    let verified = expect_json(
        ctx.admin(Method::PUT, &format!("/api/domains/{}/status", id_of(&domain)))
            .json(&json!({ "status": "verified" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert!(verified["last_checked_at"].is_string());

    let tenant = tenant_for(&ctx, &custom).await;
    assert_eq!(tenant["id"], distributor["id"]);
    assert_eq!(tenant["matched_by"], "custom_domain");

    let duplicate = ctx
        .admin(Method::POST, &format!("/api/distributors/{id}/domains"))
        .json(&json!({ "domain": custom }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    ctx.delete_distributor(id).await;
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and seeded catalog"]
async fn test_custom_price_and_tiers() {
    let ctx = TestContext::new();
    let product = ctx.any_product().await;
    let product_id = id_of(&product);
    let distributor = ctx.create_distributor("Tiered", json!({})).await;
    let id = id_of(&distributor);
    let host = distributor["email_domain"].as_str().unwrap().to_owned();

    expect_json(
        ctx.admin(Method::PUT, &format!("/api/distributors/{id}/prices/{product_id}"))
            .json(&json!({
                "custom_price": "7.00",
                "tiers": [
                    { "min_qty": 10, "max_qty": 49, "price": "6.00" },
                    { "min_qty": 50, "max_qty": null, "price": "5.00" },
                ]
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;

    let single = product_as(&ctx, &host, product_id, 1).await;
    assert_eq!(single["price"]["source"]["kind"], "custom_price");
    assert_eq!(decimal(&single["price"]["unit_price"]), Decimal::new(700, 2));

    let bulk = product_as(&ctx, &host, product_id, 60).await;
    assert_eq!(bulk["price"]["source"]["kind"], "tier");
    assert_eq!(bulk["price"]["source"]["min_qty"], 50);
    assert_eq!(decimal(&bulk["price"]["unit_price"]), Decimal::new(500, 2));

    // Other shoppers still see the base price.
    let anonymous = expect_json(
        ctx.storefront(Method::GET, &format!("/api/products/{product_id}"))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;
    assert_eq!(anonymous["price"]["source"]["kind"], "base");

    let overlapping = ctx
        .admin(Method::PUT, &format!("/api/distributors/{id}/prices/{product_id}"))
        .json(&json!({
            "custom_price": "7.00",
            "tiers": [
                { "min_qty": 1, "max_qty": 10, "price": "6.00" },
                { "min_qty": 5, "max_qty": null, "price": "5.00" },
            ]
        }))
        .send()
        .await
        .unwrap();
    assert!(overlapping.status().is_client_error());

    ctx.delete_distributor(id).await;
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and seeded catalog"]
async fn test_category_discount_beats_default_discount() {
    let ctx = TestContext::new();

    let products = expect_json(
        ctx.storefront(Method::GET, "/api/products").send().await.unwrap(),
        StatusCode::OK,
    )
    .await;
    let Some(product) = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["category_id"].is_i64())
        .cloned()
    else {
        return;
    };
    let product_id = id_of(&product);
    let category_id = product["category_id"].as_i64().unwrap();

    let distributor = ctx
        .create_distributor("Discounts", json!({ "default_discount": "5" }))
        .await;
    let id = id_of(&distributor);
    let host = distributor["email_domain"].as_str().unwrap().to_owned();

    let with_default = product_as(&ctx, &host, product_id, 1).await;
    assert_eq!(with_default["price"]["source"]["kind"], "default_discount");

    expect_json(
        ctx.admin(
            Method::PUT,
            &format!("/api/distributors/{id}/category-discounts/{category_id}"),
        )
        .json(&json!({ "discount_percent": "20" }))
        .send()
        .await
        .unwrap(),
        StatusCode::OK,
    )
    .await;

    let with_category = product_as(&ctx, &host, product_id, 1).await;
    assert_eq!(with_category["price"]["source"]["kind"], "category_discount");
    let base = decimal(&product["base_price"]);
    let expected = round_money(base * Decimal::new(80, 2));
    assert_eq!(decimal(&with_category["price"]["unit_price"]), expected);

    ctx.delete_distributor(id).await;
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and seeded catalog"]
async fn test_tenant_checkout_uses_tenant_prices() {
    let ctx = TestContext::new();
    let product = ctx.any_product().await;
    let product_id = id_of(&product);
    let distributor = ctx.create_distributor("Checkout", json!({})).await;
    let id = id_of(&distributor);
    let host = distributor["email_domain"].as_str().unwrap().to_owned();

    expect_json(
        ctx.admin(Method::PUT, &format!("/api/distributors/{id}/prices/{product_id}"))
            .json(&json!({ "custom_price": "3.33" }))
            .send()
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await;

    let order = expect_json(
        ctx.storefront_as(&host, Method::POST, "/api/checkout")
            .json(&json!({
                "customer_email": format!("buyer@{host}"),
                "customer_name": "Tenant Buyer",
                "lines": [{ "product_id": product_id, "quantity": 3 }],
            }))
            .send()
            .await
            .unwrap(),
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(order["distributor_id"], distributor["id"]);
    assert_eq!(order["items"][0]["price_source"], "custom_price");
    assert_eq!(decimal(&order["subtotal"]), Decimal::new(999, 2));

    let visible = ctx
        .storefront_as(&host, Method::GET, &format!("/api/orders/{}", id_of(&order)))
        .send()
        .await
        .unwrap();
    assert_eq!(visible.status(), StatusCode::OK);

    ctx.delete_distributor(id).await;
}
