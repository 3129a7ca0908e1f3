//! Streaming six-algorithm hasher used by `submit/sample` so the upload
//! body is read exactly once (spec §4.2: "Stream the uploaded file;
//! simultaneously compute the six hashes and encrypt").

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// The six hash digests recorded against a Sample (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleHashes {
    pub md5: String,
    pub sha1: String,
    pub sha224: String,
    pub sha256: String,
    pub sha384: String,
    pub sha512: String,
}

/// Accumulates all six digests over successive [`update`](Self::update)
/// calls so a single pass over the upload body is sufficient.
#[derive(Default)]
pub struct MultiHasher {
    md5: Md5,
    sha1: Sha1,
    sha224: Sha224,
    sha256: Sha256,
    sha384: Sha384,
    sha512: Sha512,
}

impl MultiHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.md5.update(chunk);
        self.sha1.update(chunk);
        self.sha224.update(chunk);
        self.sha256.update(chunk);
        self.sha384.update(chunk);
        self.sha512.update(chunk);
    }

    pub fn finalize(self) -> SampleHashes {
        SampleHashes {
            md5: hex::encode(self.md5.finalize()),
            sha1: hex::encode(self.sha1.finalize()),
            sha224: hex::encode(self.sha224.finalize()),
            sha256: hex::encode(self.sha256.finalize()),
            sha384: hex::encode(self.sha384.finalize()),
            sha512: hex::encode(self.sha512.finalize()),
        }
    }
}

/// Hash kinds the SB can infer from a hex string's length (spec §4.2:
/// "Infer hash-kind from length (32/40/64/56/96/128 → md5/sha1/sha256/
/// sha224/sha384/sha512)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Md5,
    Sha1,
    Sha256,
    Sha224,
    Sha384,
    Sha512,
}

impl HashKind {
    pub fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(Self::Md5),
            40 => Some(Self::Sha1),
            64 => Some(Self::Sha256),
            56 => Some(Self::Sha224),
            96 => Some(Self::Sha384),
            128 => Some(Self::Sha512),
            _ => None,
        }
    }
}

/// Compute all six digests over a single in-memory buffer (used by
/// tests and by callers that already hold the full plaintext).
pub fn hash_all(data: &[u8]) -> SampleHashes {
    let mut hasher = MultiHasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_matches_single_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let mut streamed = MultiHasher::new();
        for chunk in data.chunks(7) {
            streamed.update(chunk);
        }
        assert_eq!(streamed.finalize(), hash_all(data));
    }

    #[test]
    fn known_sha256_vector() {
        let hashes = hash_all(b"abc");
        assert_eq!(
            hashes.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_kind_from_hex_len() {
        assert_eq!(HashKind::from_hex_len(32), Some(HashKind::Md5));
        assert_eq!(HashKind::from_hex_len(40), Some(HashKind::Sha1));
        assert_eq!(HashKind::from_hex_len(64), Some(HashKind::Sha256));
        assert_eq!(HashKind::from_hex_len(56), Some(HashKind::Sha224));
        assert_eq!(HashKind::from_hex_len(96), Some(HashKind::Sha384));
        assert_eq!(HashKind::from_hex_len(128), Some(HashKind::Sha512));
        assert_eq!(HashKind::from_hex_len(10), None);
    }
}
