use chain_sol::SolError;
use thiserror::Error;
use wallet_core::IdentityError;

use crate::rpc::RpcError;

/// Everything that can stop an operation, grouped by how the caller should
/// react to it.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Bad recovery phrase or derivation path. Fatal at startup.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// PDA search exhausted every bump. Fatal for that address.
    #[error("{0}")]
    NoValidBumpFound(String),

    /// Programmer misuse while encoding an instruction or transaction.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The endpoint could not be reached or rejected the request.
    #[error("network error: {0}")]
    Network(#[from] RpcError),

    /// A required signer was missing or refused to sign.
    #[error("signing error: {0}")]
    Signing(String),

    /// Another operation from this wallet has not reached a terminal state.
    #[error("another operation is already in progress")]
    OperationInProgress,
}

impl VaultError {
    /// Whether re-initiating the same user action later can succeed.
    ///
    /// The core never retries on its own; this is advice for the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            VaultError::Network(e) => e.is_transient(),
            VaultError::OperationInProgress => true,
            _ => false,
        }
    }
}

impl From<SolError> for VaultError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::NoValidBumpFound { .. } => VaultError::NoValidBumpFound(e.to_string()),
            SolError::SigningError(msg) => VaultError::Signing(msg),
            other => VaultError::Encoding(other.to_string()),
        }
    }
}
