use crate::error::VaultError;
use crate::instruction::InstructionKind;
use crate::units::parse_sol;

/// A user action the orchestrator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Move lamports from the wallet into the team's vault. The wallet is
    /// both depositor and team authority.
    Deposit { team_id: u64, lamports: u64 },
    /// Bid on a task of a team the wallet administers.
    PlaceBid {
        team_id: u64,
        task_id: u64,
        lamports: u64,
    },
}

impl Operation {
    /// A deposit from a decimal SOL amount such as `"1.5"`.
    pub fn deposit_sol(team_id: u64, amount: &str) -> Result<Self, VaultError> {
        Ok(Operation::Deposit {
            team_id,
            lamports: parse_sol(amount)?,
        })
    }

    pub fn kind(&self) -> InstructionKind {
        match self {
            Operation::Deposit { .. } => InstructionKind::Deposit,
            Operation::PlaceBid { .. } => InstructionKind::PlaceBid,
        }
    }

    pub fn team_id(&self) -> u64 {
        match *self {
            Operation::Deposit { team_id, .. } | Operation::PlaceBid { team_id, .. } => team_id,
        }
    }

    pub fn lamports(&self) -> u64 {
        match *self {
            Operation::Deposit { lamports, .. } | Operation::PlaceBid { lamports, .. } => lamports,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), VaultError> {
        if self.lamports() == 0 {
            return Err(VaultError::Encoding(format!(
                "{} amount must be greater than zero",
                self.kind().name()
            )));
        }
        Ok(())
    }
}
