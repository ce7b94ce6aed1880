use sha2::{Digest as _, Sha256};

/// A 32-byte SHA-256 output.
pub type Digest = [u8; 32];

/// Leaf hash: one SHA-256 round over the raw bytes of a log line.
pub fn leaf_digest(line: &[u8]) -> Digest {
    Sha256::digest(line).into()
}

/// Interior hash: SHA-256 over the lowercase hex renderings of the two
/// children, left then right.
///
/// Hashing the hex text rather than the raw bytes is what deployed edge
/// agents do; changing it would break every fingerprint already anchored.
pub fn node_digest(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(hex::encode(left).as_bytes());
    hasher.update(hex::encode(right).as_bytes());
    hasher.finalize().into()
}
