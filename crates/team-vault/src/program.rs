//! The deployed team-vault program: its id and account seed layouts.

use chain_sol::{find_program_address, ProgramAddress, Pubkey, SolError};

/// `TrSvGRr4F3aVXvyGMKQWaWYwFHawWcDaiL5WqUL6DVU`
pub const PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xe1, 0x02, 0xc3, 0x09, 0x89, 0xea, 0x26, 0xfd, 0xd0, 0x38, 0x8c, 0x40, 0x38, 0x7e, 0x99,
    0x6e, 0xcd, 0x95, 0x39, 0x79, 0x86, 0xab, 0xe7, 0x04, 0xcf, 0x2c, 0x43, 0x72, 0x7d, 0x61, 0x7b,
]);

pub const TEAM_SEED: &[u8] = b"team";
pub const VAULT_SEED: &[u8] = b"vault";
pub const TASK_SEED: &[u8] = b"task";

/// Address derivation for one deployment of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultProgram {
    id: Pubkey,
}

impl VaultProgram {
    pub const fn new(id: Pubkey) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &Pubkey {
        &self.id
    }

    /// `["team", authority, team_id as u64 LE]`
    pub fn team_address(
        &self,
        authority: &Pubkey,
        team_id: u64,
    ) -> Result<ProgramAddress, SolError> {
        let team_id = team_id.to_le_bytes();
        find_program_address(&[TEAM_SEED, authority.as_ref(), &team_id], &self.id)
    }

    /// `["vault", team]`
    pub fn vault_address(&self, team: &Pubkey) -> Result<ProgramAddress, SolError> {
        find_program_address(&[VAULT_SEED, team.as_ref()], &self.id)
    }

    /// `["task", team, task_id as u64 LE]`
    pub fn task_address(&self, team: &Pubkey, task_id: u64) -> Result<ProgramAddress, SolError> {
        let task_id = task_id.to_le_bytes();
        find_program_address(&[TASK_SEED, team.as_ref(), &task_id], &self.id)
    }
}

impl Default for VaultProgram {
    fn default() -> Self {
        Self::new(PROGRAM_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk";

    fn wallet() -> Pubkey {
        WALLET.parse().unwrap()
    }

    #[test]
    fn program_id_constant_matches_base58() {
        assert_eq!(
            PROGRAM_ID.to_string(),
            "TrSvGRr4F3aVXvyGMKQWaWYwFHawWcDaiL5WqUL6DVU"
        );
    }

    #[test]
    fn team_address_golden_vector() {
        let team = VaultProgram::default().team_address(&wallet(), 1).unwrap();
        assert_eq!(
            team.address.to_string(),
            "gkpkN9Kh6XKvCGPsYC9bxe7rkpugvLCMwz8YGHYKQ8Y"
        );
        assert_eq!(team.bump, 253);
    }

    #[test]
    fn vault_and_task_golden_vectors() {
        let program = VaultProgram::default();
        let team = program.team_address(&wallet(), 1).unwrap().address;

        let vault = program.vault_address(&team).unwrap();
        assert_eq!(
            vault.address.to_string(),
            "4yEEpiX9ZcbgyBZxsREv3Hx9AkQLfdjgFoaofk2nbHe3"
        );
        assert_eq!(vault.bump, 252);

        let task = program.task_address(&team, 7).unwrap();
        assert_eq!(
            task.address.to_string(),
            "2LrR7rGj2jhFrwEwa9j9CJDXZUjzt1WtE6g6nTHFWHQh"
        );
        assert_eq!(task.bump, 255);
    }

    #[test]
    fn ids_select_distinct_accounts() {
        let program = VaultProgram::default();
        let one = program.team_address(&wallet(), 1).unwrap();
        let two = program.team_address(&wallet(), 2).unwrap();
        assert_ne!(one.address, two.address);

        let other_program = VaultProgram::new(Pubkey::new_from_array([9; 32]));
        let elsewhere = other_program.team_address(&wallet(), 1).unwrap();
        assert_ne!(one.address, elsewhere.address);
    }

    #[test]
    fn derived_accounts_are_off_curve() {
        let program = VaultProgram::default();
        let team = program.team_address(&wallet(), 42).unwrap();
        assert!(!team.address.is_on_curve());
        assert!(!program.vault_address(&team.address).unwrap().address.is_on_curve());
    }
}
