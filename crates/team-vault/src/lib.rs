//! Client core for the team-vault program.
//!
//! Derives the program's accounts, encodes deposit and place-bid
//! instructions, signs them with the wallet identity and submits them
//! through JSON-RPC, publishing each step to observers.

pub mod balance;
pub mod config;
pub mod error;
pub mod instruction;
pub mod operation;
pub mod orchestrator;
pub mod program;
pub mod rpc;
pub mod status;
pub mod units;

pub use balance::{Balance, BalanceTracker};
pub use config::{ConfigError, VaultConfig};
pub use error::VaultError;
pub use instruction::InstructionKind;
pub use operation::Operation;
pub use orchestrator::TransactionOrchestrator;
pub use program::{VaultProgram, PROGRAM_ID};
pub use rpc::{Commitment, HttpRpcClient, RpcClient, RpcError};
pub use status::{
    balance_error_message, StatusStore, TransactionStatus, IDLE_MESSAGE, WALLET_ERROR_MESSAGE,
};
pub use units::{format_sol, parse_sol, LAMPORTS_PER_SOL};
