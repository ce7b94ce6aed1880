//! HTTP API for LogChain.
//!
//! A thin adapter over the anchoring core: devices submit fingerprinted
//! batches, request anchoring, and anyone can ask whether a batch is on the
//! ledger.

pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{NodeConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::LogChainServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use logchain_crypto::SigningKey;
    use logchain_ledger::{InMemoryChain, SerializedGateway, SigningIdentity};
    use logchain_store::InMemoryBatchStore;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    const ROOT: &str = "0x5a3c0e8a7d1f2b4c6e8a0b2d4f6a8c0e2b4d6f8a0c2e4b6d8f0a2c4e6b8d0f2a";

    fn app_with(chain: Arc<InMemoryChain>, timeout: Duration, config: ServerConfig) -> Router {
        let identity = SigningIdentity::new(SigningKey::from_bytes([3; 32]), chain.chain_id());
        let ledger = Arc::new(SerializedGateway::new(chain, identity).with_confirmation_timeout(timeout));
        let store = Arc::new(InMemoryBatchStore::new());
        router::build_router(Arc::new(AppState::new(config, ledger, store)))
    }

    fn app() -> Router {
        app_with(
            Arc::new(InMemoryChain::default()),
            Duration::from_secs(5),
            ServerConfig::default(),
        )
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(app: &Router, root: &str, device: &str) -> String {
        let (status, json) = call(
            app,
            "POST",
            "/batches",
            Some(json!({
                "batch_id": "a1b2c3d4",
                "device_id": device,
                "merkle_root": root,
                "ipfs_cid": "bafy-demo",
                "size": 2,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        json["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, json) = call(&app(), "GET", "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn create_get_anchor_verify_flow() {
        let app = app();
        let id = create(&app, ROOT, "devA23").await;

        let (status, record) = call(&app, "GET", &format!("/batches/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["merkle_root"], ROOT);
        assert_eq!(record["anchored"], 0);

        let (status, anchored) = call(&app, "POST", &format!("/batches/{id}/anchor"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(anchored["status"], "anchored");
        assert_eq!(anchored["block_number"], 1);
        let tx_hash = anchored["tx_hash"].as_str().unwrap().to_string();
        assert!(tx_hash.starts_with("0x") && tx_hash.len() == 66);

        let (_, again) = call(&app, "POST", &format!("/batches/{id}/anchor"), None).await;
        assert_eq!(again["status"], "already anchored");
        assert_eq!(again["tx_hash"], tx_hash);

        let (_, record) = call(&app, "GET", &format!("/batches/{id}"), None).await;
        assert_eq!(record["anchored"], 1);
        assert_eq!(record["tx_hash"], tx_hash);

        let (status, verify) = call(&app, "GET", &format!("/batches/{id}/verify"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verify["on_ledger"], true);
        assert_eq!(verify["matched_index"], 0);
        assert_eq!(verify["discrepancy"], Value::Null);

        let (_, total) = call(&app, "GET", "/onchain/total", None).await;
        assert_eq!(total["total_batches"], 1);
    }

    #[tokio::test]
    async fn malformed_root_is_bad_request() {
        let (status, json) = call(
            &app(),
            "POST",
            "/batches",
            Some(json!({ "merkle_root": "0x1234" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_batch_is_not_found() {
        let app = app();
        let missing = logchain_types::BatchId::new();
        let (status, json) = call(&app, "GET", &format!("/batches/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");

        let (status, _) = call(&app, "POST", &format!("/batches/{missing}/anchor"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "GET", "/batches/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unanchored_batch_verifies_false() {
        let app = app();
        let id = create(&app, ROOT, "devA23").await;
        let (_, verify) = call(&app, "GET", &format!("/batches/{id}/verify"), None).await;
        assert_eq!(verify["on_ledger"], false);
        assert_eq!(verify["anchored"], false);
        assert_eq!(verify["matched_index"], Value::Null);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let app = app();
        let first = create(&app, ROOT, "dev-1").await;
        let second = create(&app, &format!("0x{}", "11".repeat(32)), "dev-2").await;

        let (_, list) = call(&app, "GET", "/batches", None).await;
        let ids: Vec<_> = list.as_array().unwrap().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(second), json!(first)]);

        let (_, list) = call(&app, "GET", "/batches?device_id=dev-1", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["id"], json!(first));

        let (_, list) = call(&app, "GET", "/batches?skip=1&limit=1", None).await;
        assert_eq!(list[0]["id"], json!(first));

        let (_, list) = call(&app, "GET", "/batches?anchored=true", None).await;
        assert!(list.as_array().unwrap().is_empty());

        let (status, list) = call(&app, "GET", "/batches?anchored=0", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);
        let (status, list) = call(&app, "GET", "/batches?anchored=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ledger_timeout_is_504_and_record_stays_unanchored() {
        let chain = Arc::new(InMemoryChain::manual(11_155_111));
        let app = app_with(chain, Duration::from_millis(30), ServerConfig::default());
        let id = create(&app, ROOT, "devA23").await;

        let (status, json) = call(&app, "POST", &format!("/batches/{id}/anchor"), None).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["recoverable"], true);

        let (_, record) = call(&app, "GET", &format!("/batches/{id}"), None).await;
        assert_eq!(record["anchored"], 0);
    }

    #[tokio::test]
    async fn offline_ledger_is_503() {
        let chain = Arc::new(InMemoryChain::default());
        let app = app_with(chain.clone(), Duration::from_secs(5), ServerConfig::default());
        let id = create(&app, ROOT, "devA23").await;

        chain.set_offline(true);
        let (status, json) = call(&app, "POST", &format!("/batches/{id}/anchor"), None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "LEDGER_UNAVAILABLE");
    }

    #[tokio::test]
    async fn indexed_verification_matches() {
        let config = ServerConfig {
            indexed_verification: true,
            ..Default::default()
        };
        let app = app_with(Arc::new(InMemoryChain::default()), Duration::from_secs(5), config);
        let id = create(&app, ROOT, "devA23").await;
        call(&app, "POST", &format!("/batches/{id}/anchor"), None).await;

        let (_, verify) = call(&app, "GET", &format!("/batches/{id}/verify"), None).await;
        assert_eq!(verify["on_ledger"], true);
        assert_eq!(verify["matched_index"], 0);
    }
}
