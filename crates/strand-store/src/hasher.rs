/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so raw data and a JSON object with identical bytes never
/// share an address.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for raw content bytes.
    pub const DATA: Self = Self {
        domain: "strand-data-v1",
    };
    /// Hasher for encoded JSON objects (chain nodes and the like).
    pub const OBJECT: Self = Self {
        domain: "strand-object-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Lowercase hex of [`digest`](Self::digest), as used in address payloads.
    pub fn hex_digest(&self, data: &[u8]) -> String {
        hex::encode(self.digest(data))
    }

    /// Verify that data produces the expected hex digest.
    pub fn verify(&self, data: &[u8], expected_hex: &str) -> bool {
        self.hex_digest(data) == expected_hex
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Returns `true` if `s` looks like a hex digest produced by [`ContentHasher`].
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
