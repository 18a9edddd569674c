#![allow(dead_code)]

use axum::Router;
use common::test_helpers::{TestError, TestResult};
use ordering::client::StockApiClient;
use ordering::model::{Location, OrderForm, OrderRequest, Quantities};
use url::Url;

/// Field values of a form that passes validation.
pub const VALID_FIELDS: [(&str, &str); 9] = [
    ("local", "opcion1"),
    ("fecha", "24/12/2025"),
    ("pollo", "2"),
    ("mila", "0"),
    ("pata", "0"),
    ("alita", "5"),
    ("suprema", "0"),
    ("menudo", "0"),
    ("rebosador", "1"),
];

pub fn valid_form() -> OrderForm {
    OrderForm::from_pairs(VALID_FIELDS)
}

/// Valid form with `key` replaced by `value`.
pub fn form_with(key: &str, value: &str) -> OrderForm {
    valid_form().with(key, value)
}

pub fn form_with_all_quantities(value: &str) -> OrderForm {
    ["pollo", "mila", "pata", "alita", "suprema", "menudo", "rebosador"]
        .iter()
        .fold(valid_form(), |form, field| form.with(*field, value))
}

pub fn valid_order() -> OrderRequest {
    OrderRequest {
        local: Location::Opcion1,
        fecha: "24/12/2025".to_string(),
        quantities: Quantities::from_array([2, 0, 0, 5, 0, 0, 1]),
    }
}

/// Serves `app` on an ephemeral local port, returning its `/stock/` URL.
pub async fn spawn_stock_api(app: Router) -> TestResult<Url> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("fake stock API stopped: {e}");
        }
    });
    Url::parse(&format!("http://{addr}/stock/")).map_err(|e| TestError::generic(e.to_string()))
}

/// URL of a port nothing listens on.
pub async fn closed_port_url() -> TestResult<Url> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Url::parse(&format!("http://{addr}/stock/")).map_err(|e| TestError::generic(e.to_string()))
}

pub async fn response_body_string(response: axum::response::Response) -> TestResult<String> {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| TestError::generic(format!("Failed to read response body: {e}")))?;
    String::from_utf8(body_bytes.to_vec())
        .map_err(|e| TestError::generic(format!("Response body is not valid UTF-8: {e}")))
}

/// Stock API client that ignores proxy settings from the environment,
/// so requests to the fake API stay on loopback.
pub fn local_client(url: Url) -> TestResult<StockApiClient> {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .map_err(|e| TestError::generic(format!("Failed to build HTTP client: {e}")))?;
    Ok(StockApiClient::with_client(client, url))
}
