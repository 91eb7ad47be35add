use std::env;
use std::time::Duration;

use chain_sol::Pubkey;
use thiserror::Error;
use wallet_core::DerivationPath;

use crate::program::PROGRAM_ID;
use crate::rpc::{Commitment, HttpRpcClient, RpcError};

pub const RPC_URL_VAR: &str = "TEAM_VAULT_RPC_URL";
pub const PROGRAM_ID_VAR: &str = "TEAM_VAULT_PROGRAM_ID";
pub const DERIVATION_PATH_VAR: &str = "TEAM_VAULT_DERIVATION_PATH";
pub const RPC_TIMEOUT_VAR: &str = "TEAM_VAULT_RPC_TIMEOUT_SECS";
pub const COMMITMENT_VAR: &str = "TEAM_VAULT_COMMITMENT";

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

/// Client settings. Every field has a default suitable for a local validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub derivation_path: DerivationPath,
    pub rpc_timeout: Duration,
    pub commitment: Commitment,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            program_id: PROGRAM_ID,
            derivation_path: DerivationPath::default(),
            rpc_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            commitment: Commitment::default(),
        }
    }
}

impl VaultConfig {
    /// Read `TEAM_VAULT_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset or empty variables
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(RPC_URL_VAR) {
            let parsed = reqwest::Url::parse(url.trim()).map_err(|e| invalid(RPC_URL_VAR, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(invalid(RPC_URL_VAR, "scheme must be http or https"));
            }
            config.rpc_url = url.trim().to_string();
        }
        if let Some(id) = get(PROGRAM_ID_VAR) {
            config.program_id = id.trim().parse().map_err(|e| invalid(PROGRAM_ID_VAR, e))?;
        }
        if let Some(path) = get(DERIVATION_PATH_VAR) {
            config.derivation_path = path
                .trim()
                .parse()
                .map_err(|e| invalid(DERIVATION_PATH_VAR, e))?;
        }
        if let Some(secs) = get(RPC_TIMEOUT_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|e| invalid(RPC_TIMEOUT_VAR, e))?;
            if secs == 0 {
                return Err(invalid(RPC_TIMEOUT_VAR, "must be at least 1 second"));
            }
            config.rpc_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = get(COMMITMENT_VAR) {
            config.commitment = level.parse().map_err(|e| invalid(COMMITMENT_VAR, e))?;
        }

        Ok(config)
    }

    pub fn rpc_client(&self) -> Result<HttpRpcClient, RpcError> {
        HttpRpcClient::new(self.rpc_url.clone(), self.rpc_timeout, self.commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = VaultConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, VaultConfig::default());
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.derivation_path.to_string(), "m/44'/501'/0'/0'");
        assert_eq!(config.rpc_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = VaultConfig::from_lookup(lookup(&[
            (RPC_URL_VAR, "https://api.devnet.solana.com"),
            (PROGRAM_ID_VAR, "11111111111111111111111111111111"),
            (DERIVATION_PATH_VAR, "m/44'/501'/2'/0'"),
            (RPC_TIMEOUT_VAR, "5"),
            (COMMITMENT_VAR, "finalized"),
        ]))
        .unwrap();

        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(config.program_id, Pubkey::default());
        assert_eq!(config.derivation_path, DerivationPath::solana(2));
        assert_eq!(config.rpc_timeout, Duration::from_secs(5));
        assert_eq!(config.commitment, Commitment::Finalized);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = VaultConfig::from_lookup(lookup(&[(RPC_URL_VAR, "  ")])).unwrap();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let cases = [
            (RPC_URL_VAR, "not a url"),
            (RPC_URL_VAR, "ftp://example.com"),
            (PROGRAM_ID_VAR, "0OIl"),
            (DERIVATION_PATH_VAR, "m/44/501"),
            (RPC_TIMEOUT_VAR, "0"),
            (RPC_TIMEOUT_VAR, "soon"),
            (COMMITMENT_VAR, "max"),
        ];
        for (var, value) in cases {
            let err = VaultConfig::from_lookup(lookup(&[(var, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { var: v, .. } if v == var),
                "{var}={value} gave {err:?}"
            );
        }
    }
}
