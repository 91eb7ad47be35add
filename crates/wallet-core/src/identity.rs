//! The process-wide signing identity.
//!
//! A [`WalletIdentity`] is restored once from a recovery phrase and then only
//! read. It never exposes private key bytes: callers get the address and
//! signatures through [`chain_sol::Signer`].

use std::fmt;

use chain_sol::{Pubkey, SolError};
use ed25519_dalek::Signer as _;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::IdentityError;
use crate::hd_derivation::{derive_ed25519_key, DerivationPath};
use crate::mnemonic::mnemonic_to_seed;

pub struct WalletIdentity {
    // Zeroized on drop by ed25519-dalek.
    signing_key: ed25519_dalek::SigningKey,
    address: Pubkey,
    derivation_path: DerivationPath,
}

impl WalletIdentity {
    /// Restore a wallet from an ordered list of recovery words.
    pub fn from_words<S: AsRef<str>>(
        words: &[S],
        passphrase: &str,
        path: &DerivationPath,
    ) -> Result<Self, IdentityError> {
        let phrase = Zeroizing::new(
            words
                .iter()
                .map(|word| word.as_ref())
                .collect::<Vec<&str>>()
                .join(" "),
        );
        Self::restore(&phrase, passphrase, path)
    }

    /// Restore a wallet from a whitespace-separated recovery phrase.
    pub fn from_phrase(
        phrase: &SecretString,
        passphrase: &SecretString,
        path: &DerivationPath,
    ) -> Result<Self, IdentityError> {
        let normalized = Zeroizing::new(
            phrase
                .expose_secret()
                .split_whitespace()
                .collect::<Vec<&str>>()
                .join(" "),
        );
        Self::restore(&normalized, passphrase.expose_secret(), path)
    }

    fn restore(
        phrase: &str,
        passphrase: &str,
        path: &DerivationPath,
    ) -> Result<Self, IdentityError> {
        let seed = mnemonic_to_seed(phrase, passphrase)?;
        let derived = derive_ed25519_key(&*seed, path)?;

        let signing_key = ed25519_dalek::SigningKey::from_bytes(&derived.private_key);
        let address = Pubkey::new_from_array(derived.public_key);
        debug!(%address, %path, "wallet identity restored");

        Ok(Self {
            signing_key,
            address,
            derivation_path: path.clone(),
        })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        &self.derivation_path
    }
}

impl chain_sol::Signer for WalletIdentity {
    fn pubkey(&self) -> Pubkey {
        self.address
    }

    fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], SolError> {
        self.signing_key
            .try_sign(message)
            .map(|sig| sig.to_bytes())
            .map_err(|e| SolError::SigningError(e.to_string()))
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("address", &self.address)
            .field("derivation_path", &self.derivation_path.to_string())
            .finish_non_exhaustive()
    }
}
