//! Program Derived Address (PDA) derivation.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || bump || program_id ||
//! "ProgramDerivedAddress")`, accepted only when the digest is NOT a valid
//! Ed25519 point. The search starts at bump 255 and walks down to 0, so the
//! result is a pure function of the input bytes.

use sha2::{Digest, Sha256};

use crate::address::Pubkey;
use crate::error::SolError;

/// Maximum number of seeds, including the bump seed.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// The string appended to every PDA preimage.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// A derived address together with the bump seed that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramAddress {
    pub address: Pubkey,
    pub bump: u8,
}

/// Find the canonical PDA for `seeds` under `program_id`.
///
/// Fails with [`SolError::NoValidBumpFound`] if all 256 bumps land on the
/// curve; callers should treat that as fatal for the address, not retry.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<ProgramAddress, SolError> {
    // The bump occupies one seed slot.
    check_seeds(seeds, MAX_SEEDS - 1)?;
    search_bumps(seeds, program_id, |candidate| !is_on_curve(candidate))
}

/// Recompute a PDA from seeds that already include the bump.
///
/// Returns an error if the digest falls on the curve.
pub fn create_program_address(
    seeds_with_bump: &[&[u8]],
    program_id: &Pubkey,
) -> Result<Pubkey, SolError> {
    check_seeds(seeds_with_bump, MAX_SEEDS)?;

    let hash = hash_seeds(seeds_with_bump, &[], program_id);
    if is_on_curve(&hash) {
        return Err(SolError::InvalidSeeds(
            "derived address lies on the ed25519 curve".into(),
        ));
    }

    Ok(Pubkey::new_from_array(hash))
}

/// True if `bytes` decompress to an Edwards point. PDAs must fail this.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

fn search_bumps(
    seeds: &[&[u8]],
    program_id: &Pubkey,
    accept: impl Fn(&[u8; 32]) -> bool,
) -> Result<ProgramAddress, SolError> {
    for bump in (0u8..=255).rev() {
        let hash = hash_seeds(seeds, &[bump], program_id);
        if accept(&hash) {
            return Ok(ProgramAddress {
                address: Pubkey::new_from_array(hash),
                bump,
            });
        }
    }

    Err(SolError::NoValidBumpFound {
        program_id: program_id.to_string(),
    })
}

fn hash_seeds(seeds: &[&[u8]], bump_seed: &[u8], program_id: &Pubkey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), SolError> {
    if seeds.len() > max_seeds {
        return Err(SolError::InvalidSeeds(format!(
            "{} seeds given, at most {max_seeds} allowed",
            seeds.len()
        )));
    }
    if let Some((index, seed)) = seeds
        .iter()
        .enumerate()
        .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
        return Err(SolError::InvalidSeeds(format!(
            "seed {index} is {} bytes, at most {MAX_SEED_LEN} allowed",
            seed.len()
        )));
    }
    Ok(())
}
