use std::time::Duration;

use logchain_crypto::SigningKey;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::transaction::SigningIdentity;

/// Environment variable overriding [`LedgerConfig::endpoint`].
pub const ENV_ENDPOINT: &str = "LOGCHAIN_LEDGER_ENDPOINT";
/// Environment variable overriding [`LedgerConfig::signing_key`].
pub const ENV_SIGNING_KEY: &str = "LOGCHAIN_SIGNING_KEY";
/// Environment variable overriding [`LedgerConfig::chain_id`].
pub const ENV_CHAIN_ID: &str = "LOGCHAIN_CHAIN_ID";

/// Ledger connection and submission settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ledger endpoint. `memory://` selects the in-process development chain.
    pub endpoint: String,
    /// Hex-encoded 32-byte Ed25519 secret of the signing identity.
    pub signing_key: Option<String>,
    /// Target network identifier, signed into every transaction.
    pub chain_id: u64,
    /// Bounded wait for a broadcast transaction to be mined.
    pub confirmation_timeout_secs: u64,
    /// How many times a stale sequence number is re-read and the
    /// transaction rebuilt before the conflict is surfaced.
    pub sequence_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::MEMORY_ENDPOINT.into(),
            signing_key: None,
            chain_id: 11_155_111,
            confirmation_timeout_secs: 600,
            sequence_retries: 1,
        }
    }
}

impl LedgerConfig {
    pub const MEMORY_ENDPOINT: &'static str = "memory://";

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn is_memory(&self) -> bool {
        self.endpoint == Self::MEMORY_ENDPOINT
    }

    /// Apply `LOGCHAIN_*` environment overrides.
    pub fn with_env_overrides(self) -> LedgerResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment-shaped).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> LedgerResult<Self> {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(key) = lookup(ENV_SIGNING_KEY) {
            self.signing_key = Some(key);
        }
        if let Some(chain_id) = lookup(ENV_CHAIN_ID) {
            self.chain_id = chain_id
                .trim()
                .parse()
                .map_err(|_| LedgerError::Config(format!("{ENV_CHAIN_ID} is not a number: {chain_id}")))?;
        }
        Ok(self)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(LedgerError::Config("ledger endpoint is empty".into()));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(LedgerError::Config("confirmation timeout must be positive".into()));
        }
        if let Some(key) = &self.signing_key {
            SigningKey::from_hex(key)
                .map_err(|_| LedgerError::Config("signing key is not 32 hex-encoded bytes".into()))?;
        }
        Ok(())
    }

    /// Build the signing identity. The development chain gets an ephemeral
    /// key when none is configured; any other endpoint requires one.
    pub fn signing_identity(&self) -> LedgerResult<SigningIdentity> {
        let key = match &self.signing_key {
            Some(hex) => SigningKey::from_hex(hex)
                .map_err(|_| LedgerError::Config("signing key is not 32 hex-encoded bytes".into()))?,
            None if self.is_memory() => SigningKey::generate(),
            None => {
                return Err(LedgerError::Config(format!(
                    "a signing key is required for endpoint {}",
                    self.endpoint
                )))
            }
        };
        Ok(SigningIdentity::new(key, self.chain_id))
    }
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("endpoint", &self.endpoint)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("chain_id", &self.chain_id)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .field("sequence_retries", &self.sequence_retries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = LedgerConfig::default();
        assert!(c.is_memory());
        assert_eq!(c.chain_id, 11_155_111);
        assert_eq!(c.confirmation_timeout(), Duration::from_secs(600));
        assert_eq!(c.sequence_retries, 1);
        c.validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: LedgerConfig = toml::from_str("chain_id = 5\n").unwrap();
        assert_eq!(c.chain_id, 5);
        assert_eq!(c.confirmation_timeout_secs, 600);
    }

    #[test]
    fn overrides_apply() {
        let c = LedgerConfig::default()
            .with_overrides(|key| match key {
                ENV_ENDPOINT => Some("https://rpc.example".into()),
                ENV_CHAIN_ID => Some("17000".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(c.endpoint, "https://rpc.example");
        assert_eq!(c.chain_id, 17000);
    }

    #[test]
    fn bad_chain_id_override_is_config_error() {
        let err = LedgerConfig::default()
            .with_overrides(|key| (key == ENV_CHAIN_ID).then(|| "sepolia".to_string()))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let c = LedgerConfig {
            confirmation_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn malformed_key_is_rejected() {
        let c = LedgerConfig {
            signing_key: Some("not-hex".into()),
            ..Default::default()
        };
        assert!(c.validate().is_err());
        assert!(c.signing_identity().is_err());
    }

    #[test]
    fn remote_endpoint_requires_key() {
        let c = LedgerConfig {
            endpoint: "https://rpc.example".into(),
            ..Default::default()
        };
        assert!(matches!(c.signing_identity(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn configured_key_is_deterministic() {
        let c = LedgerConfig {
            signing_key: Some("22".repeat(32)),
            ..Default::default()
        };
        assert_eq!(
            c.signing_identity().unwrap().account(),
            c.signing_identity().unwrap().account()
        );
    }

    #[test]
    fn debug_redacts_key() {
        let c = LedgerConfig {
            signing_key: Some("33".repeat(32)),
            ..Default::default()
        };
        let debug = format!("{c:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&"33".repeat(32)));
    }
}
