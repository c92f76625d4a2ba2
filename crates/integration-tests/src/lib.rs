//! Integration tests for Distrimart.
//!
//! The tests talk HTTP to running servers and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! dm-cli migrate
//! cargo run -p distrimart-storefront &
//! cargo run -p distrimart-admin &
//! cargo test -p distrimart-integration-tests -- --ignored --test-threads=1
//! ```
//!
//! `STOREFRONT_BASE_URL` and `ADMIN_BASE_URL` override the default
//! `http://localhost:3000` and `http://localhost:3001`.
//!
//! Every test creates its own distributor under a random email domain, so
//! runs do not interfere with each other or with seeded data.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Base URL for the admin API.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_owned())
}

/// HTTP client plus the two server addresses.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub admin_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            storefront_url: storefront_base_url(),
            admin_url: admin_base_url(),
        }
    }

    /// Storefront request without a `Host` override (anonymous shopper).
    #[must_use]
    pub fn storefront(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.storefront_url))
    }

    /// Storefront request as seen through `host`.
    #[must_use]
    pub fn storefront_as(&self, host: &str, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.storefront(method, path)
            .header(reqwest::header::HOST, host)
    }

    #[must_use]
    pub fn admin(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.admin_url))
    }

    /// Create a distributor with a unique email domain and return its JSON.
    ///
    /// # Panics
    ///
    /// Panics if the admin server rejects the request.
    pub async fn create_distributor(&self, name: &str, extra: Value) -> Value {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let mut body = json!({
            "name": format!("{name} {suffix}"),
            "email_domain": format!("{suffix}.test-distrimart.com"),
        });
        if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
            body.extend(extra);
        }

        let response = self
            .admin(reqwest::Method::POST, "/api/distributors")
            .json(&body)
            .send()
            .await
            .expect("create distributor request failed");
        expect_json(response, StatusCode::CREATED).await
    }

    /// Delete a distributor created by a test.
    pub async fn delete_distributor(&self, id: i64) {
        let _ = self
            .admin(reqwest::Method::DELETE, &format!("/api/distributors/{id}"))
            .send()
            .await;
    }

    /// First active product in the catalog, as seen by an anonymous shopper.
    ///
    /// # Panics
    ///
    /// Panics if the catalog is empty; seed it with `dm-cli seed`.
    pub async fn any_product(&self) -> Value {
        let response = self
            .storefront(reqwest::Method::GET, "/api/products")
            .send()
            .await
            .expect("product listing failed");
        let products = expect_json(response, StatusCode::OK).await;
        products
            .as_array()
            .and_then(|list| list.first())
            .cloned()
            .expect("catalog is empty, run dm-cli seed first")
    }
}

/// Assert the status and parse the JSON body.
///
/// # Panics
///
/// Panics with the response body when the status differs.
pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let text = response.text().await.expect("failed to read body");
    assert_eq!(actual, status, "unexpected status, body: {text}");
    serde_json::from_str(&text).expect("body is not JSON")
}

/// Read a decimal that was serialized as a string.
///
/// # Panics
///
/// Panics if `value` is not a decimal string.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
}

/// Numeric id field of a JSON object.
///
/// # Panics
///
/// Panics if `value["id"]` is not an integer.
#[must_use]
pub fn id_of(value: &Value) -> i64 {
    value["id"]
        .as_i64()
        .unwrap_or_else(|| panic!("missing id in {value}"))
}
