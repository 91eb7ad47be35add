//! Wallet identity for the team vault client.
//!
//! Restores a single Ed25519 signing identity from a BIP-39 recovery phrase
//! via SLIP-0010 derivation. Key material stays in memory for the process
//! lifetime and is zeroized on drop; persistence and keystores are the
//! caller's concern.

pub mod error;
pub mod hd_derivation;
pub mod identity;
pub mod mnemonic;

pub use error::IdentityError;
pub use hd_derivation::DerivationPath;
pub use identity::WalletIdentity;
pub use mnemonic::{generate_mnemonic, validate_mnemonic};
