//! API key generation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use scopegate_core::{GrantSet, KeyHasher, KeyRecord};
use std::fmt;

/// Length of the public key prefix
pub const PREFIX_LEN: usize = 8;

const SECRET_BYTES: usize = 32;

/// A freshly issued key
///
/// `key` is the only copy of the plaintext; the record holds its digest.
pub struct GeneratedKey {
    pub key: String,
    pub record: KeyRecord,
}

impl fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("prefix", &self.record.prefix)
            .field("record", &self.record.id)
            .finish_non_exhaustive()
    }
}

/// Issue a new `prefix.secret` key
///
/// The prefix identifies the key in listings; the secret is 32 random bytes,
/// URL-safe base64 without padding.
pub fn generate_key(name: impl Into<String>, scopes: GrantSet, hasher: &dyn KeyHasher) -> GeneratedKey {
    let mut rng = rand::thread_rng();

    let prefix: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(PREFIX_LEN)
        .map(char::from)
        .collect();

    let mut secret = [0u8; SECRET_BYTES];
    rng.fill_bytes(&mut secret);

    let key = format!("{}.{}", prefix, URL_SAFE_NO_PAD.encode(secret));
    let record = KeyRecord::new(name, prefix, hasher.digest(&key), scopes);

    GeneratedKey { key, record }
}

/// Public prefix of a presented key, if it has one
pub fn key_prefix(key: &str) -> Option<&str> {
    key.split_once('.')
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopegate_core::Blake3KeyHasher;

    #[test]
    fn test_generated_key_shape() {
        let hasher = Blake3KeyHasher::new();
        let scopes: GrantSet = ["posts.read"].into_iter().collect();
        let generated = generate_key("ci", scopes, &hasher);

        let prefix = key_prefix(&generated.key).unwrap();
        assert_eq!(prefix.len(), PREFIX_LEN);
        assert_eq!(prefix, generated.record.prefix);
        assert_eq!(generated.record.digest, hasher.digest(&generated.key));
        assert!(!generated.record.digest.contains(&generated.key));
        assert!(generated.record.has_scope("posts.read"));
        assert!(!format!("{:?}", generated).contains(&generated.key));
    }

    #[test]
    fn test_keys_are_unique() {
        let hasher = Blake3KeyHasher::new();
        let a = generate_key("a", GrantSet::new(), &hasher);
        let b = generate_key("b", GrantSet::new(), &hasher);
        assert_ne!(a.key, b.key);
        assert_ne!(a.record.digest, b.record.digest);
    }

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("abcd1234.secret"), Some("abcd1234"));
        assert_eq!(key_prefix("nodot"), None);
        assert_eq!(key_prefix(".secret"), None);
    }
}
