use anyhow::Context;
use logchain_server::dto::{AnchorResponse, BatchResponse, CreateBatchRequest, VerifyResponse};
use serde::de::DeserializeOwned;

/// Minimal client for the LogChain HTTP API.
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn create_batch(&self, request: &CreateBatchRequest) -> anyhow::Result<BatchResponse> {
        let response = self
            .http
            .post(format!("{}/batches", self.base))
            .json(request)
            .send()
            .await
            .with_context(|| format!("sending batch to {}", self.base))?;
        decode(response).await
    }

    pub async fn anchor(&self, id: &str) -> anyhow::Result<AnchorResponse> {
        let response = self
            .http
            .post(format!("{}/batches/{id}/anchor", self.base))
            .send()
            .await
            .with_context(|| format!("requesting anchoring of {id}"))?;
        decode(response).await
    }

    pub async fn verify(&self, id: &str) -> anyhow::Result<VerifyResponse> {
        let response = self
            .http
            .get(format!("{}/batches/{id}/verify", self.base))
            .send()
            .await
            .with_context(|| format!("verifying {id}"))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("server answered {status}: {body}");
    }
    response.json().await.context("decoding server response")
}
