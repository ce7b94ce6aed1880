//! Wire types. Field names match what deployed edge agents and the
//! dashboard already send and read.

use chrono::{DateTime, Utc};
use logchain_anchor::{AnchorOutcome, Discrepancy, Reconciliation};
use logchain_types::{BatchDraft, BatchRecord, Fingerprint};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::ServerResult;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    /// Device-chosen batch label.
    pub batch_id: Option<String>,
    pub device_id: Option<String>,
    pub user_id: Option<String>,
    pub merkle_root: String,
    pub ipfs_cid: Option<String>,
    pub size: Option<u64>,
}

impl CreateBatchRequest {
    /// Parse into a record. A malformed `merkle_root` is a validation error.
    pub fn into_record(self) -> ServerResult<BatchRecord> {
        let fingerprint = Fingerprint::parse(&self.merkle_root)?;
        Ok(BatchRecord::new(
            fingerprint,
            BatchDraft {
                device_id: self.device_id,
                user_id: self.user_id,
                batch_label: self.batch_id,
                fingerprint: Some(fingerprint),
                content_ref: self.ipfs_cid,
                line_count: self.size,
            },
        ))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub id: String,
    pub batch_id: Option<String>,
    pub device_id: Option<String>,
    pub user_id: Option<String>,
    pub merkle_root: String,
    pub ipfs_cid: Option<String>,
    pub size: Option<u64>,
    /// 0 = unanchored, 1 = anchored.
    pub anchored: u8,
    pub tx_hash: Option<String>,
    pub tx_block: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl From<&BatchRecord> for BatchResponse {
    fn from(record: &BatchRecord) -> Self {
        Self {
            id: record.id().to_string(),
            batch_id: record.batch_label().map(str::to_string),
            device_id: record.device_id().map(str::to_string),
            user_id: record.user_id().map(str::to_string),
            merkle_root: record.fingerprint().to_hex(),
            ipfs_cid: record.content_ref().map(str::to_string),
            size: record.line_count(),
            anchored: record.status().as_flag(),
            tx_hash: record.tx_ref().map(|tx| tx.to_hex()),
            tx_block: record.block_ref().map(|b| b.0),
            created_at: record.created_at(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
    pub device_id: Option<String>,
    pub user_id: Option<String>,
    /// Accepts `0`/`1` as well as `true`/`false`.
    #[serde(default, deserialize_with = "anchored_flag")]
    pub anchored: Option<bool>,
}

fn anchored_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None => Ok(None),
        Some("1" | "true") => Ok(Some(true)),
        Some("0" | "false") => Ok(Some(false)),
        Some(other) => Err(de::Error::custom(format!(
            "anchored must be 0, 1, true or false, got {other:?}"
        ))),
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorResponse {
    /// `"anchored"` or `"already anchored"`.
    pub status: String,
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

impl From<AnchorOutcome> for AnchorResponse {
    fn from(outcome: AnchorOutcome) -> Self {
        let status = if outcome.already_anchored {
            "already anchored"
        } else {
            "anchored"
        };
        Self {
            status: status.into(),
            tx_hash: outcome.tx_ref.to_hex(),
            block_number: outcome.block_ref.map(|b| b.0),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub id: String,
    pub on_ledger: bool,
    pub matched_index: Option<u64>,
    pub anchored: bool,
    pub discrepancy: Option<Discrepancy>,
}

impl VerifyResponse {
    pub fn new(record: &BatchRecord, result: Reconciliation) -> Self {
        Self {
            id: record.id().to_string(),
            on_ledger: result.on_ledger,
            matched_index: result.matched_index,
            anchored: record.is_anchored(),
            discrepancy: result.discrepancy(record),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TotalResponse {
    pub total_batches: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
