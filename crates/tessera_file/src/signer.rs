//! URL path signing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tessera_error::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Produces and checks tamper-evident tokens for URL paths.
///
/// Signing must be deterministic: the same path and key always yield the
/// same token.
pub trait Signer: Send + Sync {
    /// Token authenticating `path`.
    fn sign(&self, path: &str) -> String;

    /// Whether `token` authenticates `path`.
    fn verify(&self, path: &str, token: &str) -> bool;
}

/// HMAC-SHA-256 signer keyed by a shared secret.
///
/// Tokens are lowercase hex, 64 characters long.
///
/// # Example
///
/// ```
/// use tessera_file::{Sha256Signer, Signer};
///
/// let signer = Sha256Signer::new("secret")?;
/// let token = signer.sign("/store/abc123/hello.txt");
///
/// assert!(signer.verify("/store/abc123/hello.txt", &token));
/// assert!(!signer.verify("/store/abc124/hello.txt", &token));
/// # Ok::<(), tessera_error::ConfigError>(())
/// ```
#[derive(Clone)]
pub struct Sha256Signer {
    mac: HmacSha256,
}

impl Sha256Signer {
    /// Create a signer from a secret of any length.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the MAC rejects the key.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let mac = HmacSha256::new_from_slice(secret.as_ref())
            .map_err(|e| ConfigError::new(format!("Invalid signing key: {}", e)))?;
        Ok(Self { mac })
    }
}

impl Signer for Sha256Signer {
    fn sign(&self, path: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(path.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn verify(&self, path: &str, token: &str) -> bool {
        let Ok(tag) = hex::decode(token) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(path.as_bytes());
        mac.verify_slice(&tag).is_ok()
    }
}

impl std::fmt::Debug for Sha256Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Signer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231, test case 2
    #[test]
    fn matches_hmac_reference_vector() {
        let signer = Sha256Signer::new("Jefe").unwrap();
        assert_eq!(
            signer.sign("what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    // RFC 4231, test case 6 (key longer than one block)
    #[test]
    fn hashes_long_keys() {
        let signer = Sha256Signer::new([0xaau8; 131]).unwrap();
        assert_eq!(
            signer.sign("Test Using Larger Than Block-Size Key - Hash Key First"),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn rejects_truncated_tokens() {
        let signer = Sha256Signer::new("secret").unwrap();
        let token = signer.sign("/store/id/name");
        assert!(!signer.verify("/store/id/name", &token[..32]));
    }

    #[test]
    fn rejects_tokens_that_are_not_hex() {
        let signer = Sha256Signer::new("secret").unwrap();
        let token = signer.sign("/store/id/name").replace('a', "z");
        assert!(!signer.verify("/store/id/name", &token));
        assert!(!signer.verify("/store/id/name", ""));
    }

    #[test]
    fn accepts_uppercase_hex() {
        let signer = Sha256Signer::new("secret").unwrap();
        let token = signer.sign("/store/id/name");
        assert!(signer.verify("/store/id/name", &token.to_uppercase()));
    }
}
