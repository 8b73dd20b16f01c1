//! Content hashing for manifest entries.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest as _, Sha1};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Files are fed to the digest in chunks of this many bytes.
pub const CHUNK_SIZE: usize = 8192;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// SHA-1 with 160-bit output.
    #[default]
    Sha1,
    /// BLAKE3 with 256-bit output.
    Blake3,
}

impl Algorithm {
    /// Returns the string representation of the algorithm (for CLI flags).
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sha1 => "sha1",
            Algorithm::Blake3 => "blake3",
        }
    }

    /// Parse algorithm from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "sha1" => Ok(Algorithm::Sha1),
            "blake3" => Ok(Algorithm::Blake3),
            _ => Err(Error::unsupported_algorithm(s)),
        }
    }

    /// Length of a digest in hex characters.
    pub fn hex_len(&self) -> usize {
        match self {
            Algorithm::Sha1 => 40,
            Algorithm::Blake3 => 64,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum StreamHasher {
    Sha1(Sha1),
    Blake3(Box<blake3::Hasher>),
}

impl StreamHasher {
    fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Sha1 => StreamHasher::Sha1(Sha1::new()),
            Algorithm::Blake3 => StreamHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            StreamHasher::Sha1(h) => h.update(chunk),
            StreamHasher::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finalize(self) -> Digest {
        let hex = match self {
            StreamHasher::Sha1(h) => hex::encode(h.finalize()),
            StreamHasher::Blake3(h) => hex::encode(h.finalize().as_bytes()),
        };
        Digest(hex)
    }
}

/// A content digest rendered as lowercase hex.
///
/// Serializes as a plain JSON string. Deserialization rejects anything that
/// is not a non-empty, even-length, lowercase hex string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Create a Digest from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.is_empty() || hex_str.len() % 2 != 0 {
            return Err(Error::invalid_digest(format!(
                "Expected an even, non-zero number of hex characters, got {}",
                hex_str.len()
            )));
        }

        if let Some(c) = hex_str
            .chars()
            .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
        {
            return Err(Error::invalid_digest(format!(
                "Unexpected character {:?} in {}",
                c, hex_str
            )));
        }

        Ok(Digest(hex_str.to_string()))
    }

    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hash raw bytes.
    pub fn hash_bytes(algorithm: Algorithm, data: &[u8]) -> Self {
        let mut hasher = StreamHasher::new(algorithm);
        hasher.update(data);
        hasher.finalize()
    }

    /// Hash data from a reader, streaming it in [`CHUNK_SIZE`] chunks.
    pub fn hash_reader<R: Read>(algorithm: Algorithm, mut reader: R) -> std::io::Result<Self> {
        let mut hasher = StreamHasher::new(algorithm);
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize())
    }

    /// Hash a file. Open and read failures are reported as [`Error::Unreadable`].
    pub fn hash_file(algorithm: Algorithm, path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::unreadable(path, e))?;
        Self::hash_reader(algorithm, file).map_err(|e| Error::unreadable(path, e))
    }
}

impl TryFrom<String> for Digest {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Digest::from_hex(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.0)
    }
}
