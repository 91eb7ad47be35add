use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::IdentityError;

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;

/// Solana's BIP-44 coin type.
pub const SOLANA_COIN_TYPE: u32 = 501;

/// An all-hardened BIP-32 style path, as SLIP-0010 requires for Ed25519.
///
/// Solana wallets use `m/44'/501'/account'/0'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    /// Child indices without the hardened bit.
    components: Vec<u32>,
}

impl DerivationPath {
    pub fn solana(account: u32) -> Self {
        Self {
            components: vec![44, SOLANA_COIN_TYPE, account, 0],
        }
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }
}

impl Default for DerivationPath {
    fn default() -> Self {
        Self::solana(0)
    }
}

impl FromStr for DerivationPath {
    type Err = IdentityError;

    /// Parse "m/44'/501'/0'/0'" into [44, 501, 0, 0]
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let unsupported = |why: &str| IdentityError::UnsupportedPath(format!("{path}: {why}"));

        let rest = path
            .strip_prefix("m/")
            .ok_or_else(|| unsupported("path must start with m/"))?;

        let components = rest
            .split('/')
            .map(|component| {
                let index = component
                    .strip_suffix('\'')
                    .or_else(|| component.strip_suffix('h'))
                    .ok_or_else(|| unsupported("ed25519 derivation needs hardened components"))?;
                let index: u32 = index
                    .parse()
                    .map_err(|e| unsupported(&format!("invalid component {component:?}: {e}")))?;
                if index >= HARDENED {
                    return Err(unsupported("component out of range"));
                }
                Ok(index)
            })
            .collect::<Result<Vec<u32>, IdentityError>>()?;

        Ok(Self { components })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.components {
            write!(f, "/{index}'")?;
        }
        Ok(())
    }
}

/// Derived Ed25519 key material. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedEd25519Key {
    pub private_key: [u8; 32],
    pub public_key: [u8; 32],
}

impl fmt::Debug for DerivedEd25519Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedEd25519Key")
            .field("public_key", &chain_sol::Pubkey::new_from_array(self.public_key))
            .finish_non_exhaustive()
    }
}

/// Derive an Ed25519 key from a BIP-39 seed using SLIP-0010.
pub fn derive_ed25519_key(
    seed: &[u8],
    path: &DerivationPath,
) -> Result<DerivedEd25519Key, IdentityError> {
    // Master key: HMAC-SHA512(key="ed25519 seed", data=seed)
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| IdentityError::DerivationFailed(e.to_string()))?;
    mac.update(seed);
    let mut result = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    for child_index in path.components() {
        let mut mac = HmacSha512::new_from_slice(&chain_code)
            .map_err(|e| IdentityError::DerivationFailed(e.to_string()))?;
        // Hardened child: 0x00 || key || index (with hardened bit set)
        mac.update(&[0x00]);
        mac.update(&key);
        mac.update(&(child_index | HARDENED).to_be_bytes());
        result = mac.finalize().into_bytes();

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
    }

    let signing_key = ed25519_dalek::SigningKey::from_bytes(&key);
    let derived = DerivedEd25519Key {
        private_key: key,
        public_key: signing_key.verifying_key().to_bytes(),
    };

    key.zeroize();
    chain_code.zeroize();
    result.as_mut_slice().zeroize();

    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;

    // BIP-39 test vector: "abandon" x11 + "about"
    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_derive_known_solana_address() {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let key = derive_ed25519_key(&*seed, &DerivationPath::default()).unwrap();
        assert_eq!(
            chain_sol::Pubkey::new_from_array(key.public_key).to_string(),
            "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk"
        );
    }

    #[test]
    fn test_different_accounts_different_keys() {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let key0 = derive_ed25519_key(&*seed, &DerivationPath::solana(0)).unwrap();
        let key1 = derive_ed25519_key(&*seed, &DerivationPath::solana(1)).unwrap();
        assert_ne!(key0.public_key, key1.public_key);
    }

    #[test]
    fn test_parse_derivation_path() {
        let path: DerivationPath = "m/44'/501'/0'/0'".parse().unwrap();
        assert_eq!(path.components(), &[44, 501, 0, 0]);
        assert_eq!(path, DerivationPath::default());
        assert_eq!(path.to_string(), "m/44'/501'/0'/0'");
    }

    #[test]
    fn test_h_suffix_is_accepted() {
        let path: DerivationPath = "m/44h/501h/2h/0h".parse().unwrap();
        assert_eq!(path, DerivationPath::solana(2));
    }

    #[test]
    fn test_non_hardened_path_is_unsupported() {
        let err = "m/44'/501'/0'/0".parse::<DerivationPath>().unwrap_err();
        assert!(matches!(err, IdentityError::UnsupportedPath(_)));
    }

    #[test]
    fn test_malformed_paths_are_unsupported() {
        for path in ["44'/501'", "m/", "m/abc'", "m/2147483648'"] {
            assert!(path.parse::<DerivationPath>().is_err(), "{path} parsed");
        }
    }

    #[test]
    fn test_debug_hides_private_key() {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let key = derive_ed25519_key(&*seed, &DerivationPath::default()).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("HAgk14Jp"));
        assert!(!debug.contains("private_key"));
    }
}
