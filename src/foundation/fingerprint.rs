//! Content identifiers used as frame-cache keys.
//!
//! Identifiers are lowercase hex SHA-256 digests so they are safe to embed in file names and stay
//! stable across runs and platforms.

use std::io::Read;

use sha2::{Digest as _, Sha256};

use crate::foundation::error::ReelResult;

/// Incremental builder for a content identifier.
#[derive(Clone, Default)]
pub struct ContentId {
    hasher: Sha256,
}

impl ContentId {
    /// Empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(bytes);
        self
    }

    /// Feed a little-endian `u32`.
    pub fn write_u32(&mut self, v: u32) -> &mut Self {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Stream an entire reader into the digest.
    pub fn write_reader<R: Read>(&mut self, mut reader: R) -> ReelResult<&mut Self> {
        std::io::copy(&mut reader, &mut self.hasher)?;
        Ok(self)
    }

    /// Lowercase hex digest.
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

/// Identifier of an in-memory byte string.
pub fn content_id(bytes: &[u8]) -> String {
    let mut id = ContentId::new();
    id.write_bytes(bytes);
    id.finish()
}

/// Identifiers end up in cache file names, so only a conservative character set is accepted.
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
