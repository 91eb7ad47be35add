use thiserror::Error;

/// Failures while restoring a wallet identity. All of them are fatal at
/// startup: nothing downstream can run without a signer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Unsupported derivation path: {0}")]
    UnsupportedPath(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),
}
