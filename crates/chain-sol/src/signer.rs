//! The signing capability consumed by transaction assembly.

use ed25519_dalek::Signer as _;

use crate::address::Pubkey;
use crate::error::SolError;

/// Something that can produce Ed25519 signatures for one address.
///
/// Implementations own their key material; callers only ever see the public
/// key and the 64-byte signature.
pub trait Signer: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], SolError>;
}

impl Signer for ed25519_dalek::SigningKey {
    fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.verifying_key().to_bytes())
    }

    fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], SolError> {
        let signature = self
            .try_sign(message)
            .map_err(|e| SolError::SigningError(e.to_string()))?;
        Ok(signature.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, VerifyingKey};

    #[test]
    fn signing_key_signature_verifies() {
        let key = ed25519_dalek::SigningKey::from_bytes(&[0x42u8; 32]);
        let sig = key.sign_message(b"hello").unwrap();

        let vk = VerifyingKey::from_bytes(key.pubkey().as_array()).unwrap();
        assert!(vk
            .verify_strict(b"hello", &Signature::from_bytes(&sig))
            .is_ok());
    }

    #[test]
    fn random_key_pubkey_matches_verifying_key() {
        let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        assert_eq!(key.pubkey().to_bytes(), key.verifying_key().to_bytes());
    }
}
