use std::fmt;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// BLAKE3 digest of a file's content.
///
/// Serializes as a 64-character lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.short_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}

/// Content hasher used for hash-only comparisons.
///
/// Digests are plain BLAKE3 over the file bytes, so they can be checked with
/// any external BLAKE3 tool.
pub struct ContentHasher;

impl ContentHasher {
    /// Hash an in-memory buffer.
    pub fn hash(data: &[u8]) -> ContentDigest {
        ContentDigest(*blake3::hash(data).as_bytes())
    }

    /// Hash everything readable from `reader`.
    pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<ContentDigest> {
        let mut hasher = blake3::Hasher::new();
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(ContentDigest(*hasher.finalize().as_bytes()))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(data: &[u8], expected: &ContentDigest) -> bool {
        Self::hash(data) == *expected
    }
}
