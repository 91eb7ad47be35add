//! Instruction encoding for the team-vault program.
//!
//! Payload layout is Anchor's: an 8-byte discriminator
//! (`sha256("global:<name>")[..8]`) followed by each argument as a u64 in
//! little-endian order. Account order is fixed per instruction and must
//! match the program's declaration.

use chain_sol::{AccountMeta, Instruction, Pubkey, SYSTEM_PROGRAM_ID};

use crate::error::VaultError;

pub const DEPOSIT_DISCRIMINATOR: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];
pub const PLACE_BID_DISCRIMINATOR: [u8; 8] = [238, 77, 148, 91, 200, 151, 92, 146];

/// One position in an instruction's account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSlot {
    pub name: &'static str,
    pub is_signer: bool,
    pub is_writable: bool,
}

const fn slot(name: &'static str, is_signer: bool, is_writable: bool) -> AccountSlot {
    AccountSlot {
        name,
        is_signer,
        is_writable,
    }
}

pub const DEPOSIT_ACCOUNTS: [AccountSlot; 5] = [
    slot("team", false, false),
    slot("vault", false, true),
    slot("depositor", true, true),
    slot("authority", true, false),
    slot("system_program", false, false),
];

pub const PLACE_BID_ACCOUNTS: [AccountSlot; 3] = [
    slot("team", false, false),
    slot("task", false, true),
    slot("bidder", true, false),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    Deposit,
    PlaceBid,
}

impl InstructionKind {
    /// The program-side instruction name.
    pub fn name(&self) -> &'static str {
        match self {
            InstructionKind::Deposit => "deposit",
            InstructionKind::PlaceBid => "place_bid",
        }
    }

    pub fn discriminator(&self) -> [u8; 8] {
        match self {
            InstructionKind::Deposit => DEPOSIT_DISCRIMINATOR,
            InstructionKind::PlaceBid => PLACE_BID_DISCRIMINATOR,
        }
    }

    pub fn accounts(&self) -> &'static [AccountSlot] {
        match self {
            InstructionKind::Deposit => &DEPOSIT_ACCOUNTS,
            InstructionKind::PlaceBid => &PLACE_BID_ACCOUNTS,
        }
    }

    /// Number of u64 arguments after the discriminator.
    pub fn arg_count(&self) -> usize {
        1
    }
}

/// Encode one program instruction.
///
/// `accounts` must line up with [`InstructionKind::accounts`] and `args`
/// must have [`InstructionKind::arg_count`] entries; anything else is a
/// programming error and reported as [`VaultError::Encoding`].
pub fn build(
    kind: InstructionKind,
    program_id: &Pubkey,
    accounts: &[Pubkey],
    args: &[u64],
) -> Result<Instruction, VaultError> {
    let layout = kind.accounts();
    if accounts.len() != layout.len() {
        return Err(VaultError::Encoding(format!(
            "{} expects {} accounts, got {}",
            kind.name(),
            layout.len(),
            accounts.len()
        )));
    }
    if args.len() != kind.arg_count() {
        return Err(VaultError::Encoding(format!(
            "{} expects {} arguments, got {}",
            kind.name(),
            kind.arg_count(),
            args.len()
        )));
    }

    let mut data = Vec::with_capacity(8 + 8 * args.len());
    data.extend_from_slice(&kind.discriminator());
    for arg in args {
        data.extend_from_slice(&arg.to_le_bytes());
    }

    let accounts = layout
        .iter()
        .zip(accounts)
        .map(|(slot, pubkey)| AccountMeta {
            pubkey: *pubkey,
            is_signer: slot.is_signer,
            is_writable: slot.is_writable,
        })
        .collect();

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositAccounts {
    pub team: Pubkey,
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub authority: Pubkey,
}

pub fn deposit(
    program_id: &Pubkey,
    accounts: &DepositAccounts,
    lamports: u64,
) -> Result<Instruction, VaultError> {
    build(
        InstructionKind::Deposit,
        program_id,
        &[
            accounts.team,
            accounts.vault,
            accounts.depositor,
            accounts.authority,
            SYSTEM_PROGRAM_ID,
        ],
        &[lamports],
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceBidAccounts {
    pub team: Pubkey,
    pub task: Pubkey,
    pub bidder: Pubkey,
}

pub fn place_bid(
    program_id: &Pubkey,
    accounts: &PlaceBidAccounts,
    lamports: u64,
) -> Result<Instruction, VaultError> {
    build(
        InstructionKind::PlaceBid,
        program_id,
        &[accounts.team, accounts.task, accounts.bidder],
        &[lamports],
    )
}
