//! Solana ledger primitives for the team vault client.
//!
//! This crate handles addresses, program-derived address search, and the
//! legacy transaction wire format, all without pulling in `solana-sdk`
//! (which drags in 200+ transitive dependencies).
//!
//! Instead we implement Solana's compact binary wire format by hand, using
//! `ed25519-dalek` for signing, `curve25519-dalek` for the off-curve check
//! and `bs58` for Base58 encoding. Nothing here performs I/O.

pub mod address;
pub mod error;
pub mod pda;
pub mod signer;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use address::{Pubkey, SYSTEM_PROGRAM_ID};
pub use error::SolError;
pub use pda::{create_program_address, find_program_address, ProgramAddress};
pub use signer::Signer;
pub use transaction::{
    decode_compact_u16, encode_compact_u16, AccountMeta, Blockhash, CompiledInstruction,
    Instruction, Message, MessageHeader, Transaction,
};
