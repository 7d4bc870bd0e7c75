//! Credential hashing

/// Turns a presented secret into the digest stored on a [`KeyRecord`]
///
/// [`KeyRecord`]: crate::types::KeyRecord
pub trait KeyHasher: Send + Sync {
    fn digest(&self, secret: &str) -> String;
}

/// BLAKE3 digest, optionally keyed with a server-side pepper
///
/// API keys are long random strings, so a fast hash is sufficient for
/// lookup; a pepper keeps a leaked table from being matched offline.
#[derive(Clone, Default)]
pub struct Blake3KeyHasher {
    pepper: Option<[u8; 32]>,
}

impl Blake3KeyHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pepper(pepper: [u8; 32]) -> Self {
        Self {
            pepper: Some(pepper),
        }
    }
}

impl KeyHasher for Blake3KeyHasher {
    fn digest(&self, secret: &str) -> String {
        let hash = match &self.pepper {
            Some(key) => blake3::keyed_hash(key, secret.as_bytes()),
            None => blake3::hash(secret.as_bytes()),
        };
        hex::encode(hash.as_bytes())
    }
}

impl std::fmt::Debug for Blake3KeyHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blake3KeyHasher")
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}
