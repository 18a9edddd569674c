use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::error::SubmitError;
use crate::model::OrderRequest;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Remote service that records validated orders.
#[async_trait]
pub trait OrderIntake: Send + Sync {
    /// Returns the JSON body the service answered with.
    async fn submit(&self, order: &OrderRequest) -> Result<Value, SubmitError>;
}

/// HTTP client for the stock/order-intake API. One attempt per order,
/// no timeout beyond what the transport applies.
#[derive(Clone, Debug)]
pub struct StockApiClient {
    client: reqwest::Client,
    url: Url,
}

impl StockApiClient {
    pub fn new(url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: Url) -> Self {
        tracing::info!(url = %url, "Initializing stock API client");
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn send(&self, order: &OrderRequest) -> Result<reqwest::Response, SubmitError> {
        let body = serde_json::to_vec(order)?;
        tracing::debug!(url = %self.url, local = %order.local, fecha = %order.fecha, "Posting order");

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl OrderIntake for StockApiClient {
    async fn submit(&self, order: &OrderRequest) -> Result<Value, SubmitError> {
        let response = self.send(order).await?;
        classify_response(response).await
    }
}

/// Turns a stock API response into its JSON body or the matching failure.
/// Bodies of rejected responses are logged, never returned.
pub async fn classify_response(response: reqwest::Response) -> Result<Value, SubmitError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    if !status.is_success() {
        let body = read_diagnostic_body(response).await;
        tracing::error!(status = %status, body = %body, "Stock API returned an error response");
        return Err(SubmitError::UpstreamStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    if !content_type
        .as_deref()
        .is_some_and(|value| value.contains(JSON_CONTENT_TYPE))
    {
        let body = read_diagnostic_body(response).await;
        tracing::error!(
            content_type = content_type.as_deref().unwrap_or("<none>"),
            body = %body,
            "Stock API did not answer with JSON"
        );
        return Err(SubmitError::UpstreamFormat);
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn read_diagnostic_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stock API response body");
            String::new()
        }
    }
}
