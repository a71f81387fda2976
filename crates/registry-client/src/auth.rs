//! Collaborators the registry client consumes but does not implement.

use anyhow::Result;
use sha2::{Digest, Sha256};

/// Supplies the signed-in user's credentials and wallet identity.
pub trait AuthContext: Send + Sync {
    /// Bearer token for the current session. Fails when nobody is signed in.
    fn load_token(&self) -> Result<String>;

    /// Public address of the wallet stored on this machine.
    fn public_key_for_local_wallet(&self) -> Result<String>;
}

/// Derives the metahash integrity tag from a content hash.
pub trait MetaHasher: Send + Sync {
    fn hash_asset(&self, hash: &str) -> Result<String>;
}

/// Lowercase hex SHA-256 over the UTF-8 bytes of the content hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256MetaHasher;

impl MetaHasher for Sha256MetaHasher {
    fn hash_asset(&self, hash: &str) -> Result<String> {
        Ok(format!("{:x}", Sha256::digest(hash.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_metahash_is_deterministic() {
        let h = Sha256MetaHasher;
        let a = h.hash_asset("deadbeef").unwrap();
        assert_eq!(a, h.hash_asset("deadbeef").unwrap());
        assert_eq!(a.len(), 64);
        assert_ne!(a, h.hash_asset("deadbeee").unwrap());
    }

    #[test]
    fn sha256_metahash_known_value() {
        // sha256("abc")
        assert_eq!(
            Sha256MetaHasher.hash_asset("abc").unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
