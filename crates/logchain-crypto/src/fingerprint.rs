use logchain_types::Fingerprint;
use serde::{Deserialize, Serialize};

use crate::hasher::{leaf_digest, node_digest, Digest};

/// Side of a sibling in a line proof path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Incremental fingerprint construction over an ordered batch of log lines.
///
/// Lines are hashed as they are pushed; folding happens in [`finish`].
/// Order is significant: the same lines in a different order produce a
/// different fingerprint.
///
/// [`finish`]: FingerprintBuilder::finish
#[derive(Clone, Debug, Default)]
pub struct FingerprintBuilder {
    leaves: Vec<Digest>,
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one log line, bytes exactly as read.
    pub fn push_line(&mut self, line: impl AsRef<[u8]>) -> &mut Self {
        self.leaves.push(leaf_digest(line.as_ref()));
        self
    }

    /// Append every line of an iterator, in order.
    pub fn extend<I, L>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        self.leaves
            .extend(lines.into_iter().map(|line| leaf_digest(line.as_ref())));
        self
    }

    /// Number of lines pushed so far.
    pub fn line_count(&self) -> usize {
        self.leaves.len()
    }

    /// Fold the leaves into a fingerprint. `None` for an empty batch.
    pub fn finish(&self) -> Option<Fingerprint> {
        let mut level = self.leaves.clone();
        if level.is_empty() {
            return None;
        }
        while level.len() > 1 {
            level = fold_level(&level);
        }
        Some(Fingerprint::from_hash(level[0]))
    }
}

/// Fingerprint an ordered batch of lines in one call.
///
/// Returns `None` for an empty batch; such a batch has nothing to anchor.
pub fn fingerprint_lines<I, L>(lines: I) -> Option<Fingerprint>
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut builder = FingerprintBuilder::new();
    builder.extend(lines);
    builder.finish()
}

/// One level up: hash adjacent pairs left to right. An unpaired last node is
/// hashed with itself, never carried up unhashed.
fn fold_level(level: &[Digest]) -> Vec<Digest> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => node_digest(left, right),
            [only] => node_digest(only, only),
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

/// The full fold of a batch, kept level by level so that individual lines
/// can be proven against the fingerprint.
#[derive(Clone, Debug)]
pub struct BatchTree {
    /// Level 0 = line digests, last level = the single root.
    levels: Vec<Vec<Digest>>,
}

impl BatchTree {
    /// Build the tree for an ordered batch. `None` for an empty batch.
    pub fn from_lines<I, L>(lines: I) -> Option<Self>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let leaves: Vec<Digest> = lines
            .into_iter()
            .map(|line| leaf_digest(line.as_ref()))
            .collect();
        if leaves.is_empty() {
            return None;
        }

        let mut levels = vec![leaves];
        while levels[levels.len() - 1].len() > 1 {
            let next = fold_level(&levels[levels.len() - 1]);
            levels.push(next);
        }
        Some(Self { levels })
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_hash(self.levels[self.levels.len() - 1][0])
    }

    pub fn line_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Inclusion proof for the line at `index`.
    pub fn proof(&self, index: usize) -> Option<LineProof> {
        if index >= self.line_count() {
            return None;
        }

        let mut path = Vec::with_capacity(self.levels.len() - 1);
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling, side) = if idx % 2 == 0 {
                // Unpaired last node: its sibling is itself.
                let sibling = level.get(idx + 1).copied().unwrap_or(level[idx]);
                (sibling, Side::Right)
            } else {
                (level[idx - 1], Side::Left)
            };
            path.push((sibling, side));
            idx /= 2;
        }

        Some(LineProof {
            index,
            line_digest: self.levels[0][index],
            path,
            fingerprint: self.fingerprint(),
        })
    }
}

/// Proof that one log line is part of the batch behind a fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProof {
    /// Position of the line within the batch.
    pub index: usize,
    #[serde(with = "hex_digest")]
    pub line_digest: Digest,
    /// Sibling digests and sides, from the line up to the root.
    #[serde(with = "hex_path")]
    pub path: Vec<(Digest, Side)>,
    pub fingerprint: Fingerprint,
}

impl LineProof {
    /// Recompute the fingerprint from the path alone.
    pub fn computed_root(&self) -> Fingerprint {
        let mut current = self.line_digest;
        for (sibling, side) in &self.path {
            current = match side {
                Side::Left => node_digest(sibling, &current),
                Side::Right => node_digest(&current, sibling),
            };
        }
        Fingerprint::from_hash(current)
    }

    /// Check that `line` hashes to the proven leaf and that the path leads
    /// to the claimed fingerprint.
    pub fn verify(&self, line: impl AsRef<[u8]>) -> bool {
        leaf_digest(line.as_ref()) == self.line_digest && self.computed_root() == self.fingerprint
    }
}

mod hex_digest {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&s, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}

mod hex_path {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Side;

    #[derive(Serialize, Deserialize)]
    struct Step {
        sibling: String,
        side: Side,
    }

    pub fn serialize<S: Serializer>(
        path: &[([u8; 32], Side)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let steps: Vec<Step> = path
            .iter()
            .map(|(sibling, side)| Step {
                sibling: hex::encode(sibling),
                side: *side,
            })
            .collect();
        steps.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<([u8; 32], Side)>, D::Error> {
        let steps = Vec::<Step>::deserialize(deserializer)?;
        steps
            .into_iter()
            .map(|step| -> Result<([u8; 32], Side), D::Error> {
                let mut out = [0u8; 32];
                hex::decode_to_slice(&step.sibling, &mut out).map_err(serde::de::Error::custom)?;
                Ok((out, step.side))
            })
            .collect()
    }
}
