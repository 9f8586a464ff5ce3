//! Caller-owned commit input model.
//!
//! The engine never reads a repository itself; the surrounding system hands
//! it an already-ordered list of [`Commit`]s (typically reverse
//! chronological). A commit's position in that list is its log index.

use std::fmt;

use revgraph_error::{Error, Result};

const HASH_LEN: usize = 20;

/// Opaque commit identity.
///
/// Fixed-width so it is `Copy` and cheap to key maps with. Abbreviated hex
/// input is accepted and zero-extended, matching how callers hand around
/// shortened hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitHash([u8; HASH_LEN]);

impl CommitHash {
    pub fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a full or abbreviated hex hash (1..=40 hex digits).
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.is_empty() || hex.len() > HASH_LEN * 2 {
            return Err(Error::invalid_argument(format!(
                "hash must be 1..=40 hex digits, got {} chars",
                hex.len()
            ))
            .with_operation("commit_hash::from_hex"));
        }

        let mut bytes = [0u8; HASH_LEN];
        // Zero-extend on the left so short hashes compare as small values.
        let digits: Vec<u8> = hex
            .bytes()
            .map(|b| match b {
                b'0'..=b'9' => Ok(b - b'0'),
                b'a'..=b'f' => Ok(b - b'a' + 10),
                b'A'..=b'F' => Ok(b - b'A' + 10),
                other => Err(Error::invalid_argument(format!(
                    "invalid hex digit '{}'",
                    other as char
                ))
                .with_operation("commit_hash::from_hex")),
            })
            .collect::<Result<_>>()?;

        let total_nibbles = HASH_LEN * 2;
        let offset = total_nibbles - digits.len();
        for (i, digit) in digits.into_iter().enumerate() {
            let nibble = offset + i;
            bytes[nibble / 2] |= digit << (if nibble % 2 == 0 { 4 } else { 0 });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form: the trailing 8 hex digits carry the value for
        // zero-extended abbreviated hashes.
        let full = self.to_string();
        write!(f, "CommitHash({})", &full[full.len() - 8..])
    }
}

/// One commit of the input log: identity plus ordered parent identities.
///
/// Immutable and owned by the caller; the builder only borrows a slice of
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    hash: CommitHash,
    parents: Vec<CommitHash>,
}

impl Commit {
    pub fn new(hash: CommitHash, parents: Vec<CommitHash>) -> Self {
        Self { hash, parents }
    }

    pub fn hash(&self) -> CommitHash {
        self.hash
    }

    /// Parent hashes in significance order; the first parent continues this
    /// commit's own lane.
    pub fn parents(&self) -> &[CommitHash] {
        &self.parents
    }
}
