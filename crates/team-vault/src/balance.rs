use std::sync::Arc;

use chain_sol::Pubkey;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::VaultError;
use crate::rpc::RpcClient;
use crate::units::{format_sol, lamports_to_sol};

/// A balance snapshot. `lamports` is authoritative; SOL is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub lamports: u64,
    pub as_of: DateTime<Utc>,
}

impl Balance {
    pub fn sol(&self) -> f64 {
        lamports_to_sol(self.lamports)
    }

    /// e.g. `"Connected: 1.50 SOL"`
    pub fn summary(&self) -> String {
        format!("Connected: {} SOL", format_sol(self.lamports, 2))
    }
}

/// Last known balance of one wallet, refreshed on demand.
///
/// The cache only moves forward on a successful fetch; a failed refresh
/// leaves the previous snapshot in place.
pub struct BalanceTracker {
    rpc: Arc<dyn RpcClient>,
    owner: Pubkey,
    cache: watch::Sender<Option<Balance>>,
}

impl BalanceTracker {
    pub fn new(rpc: Arc<dyn RpcClient>, owner: Pubkey) -> Self {
        let (cache, _) = watch::channel(None);
        Self { rpc, owner, cache }
    }

    pub async fn refresh(&self) -> Result<Balance, VaultError> {
        match self.rpc.get_balance(&self.owner).await {
            Ok(lamports) => {
                let balance = Balance {
                    lamports,
                    as_of: Utc::now(),
                };
                info!(address = %self.owner, lamports, "balance refreshed");
                self.cache.send_replace(Some(balance));
                Ok(balance)
            }
            Err(e) => {
                warn!(address = %self.owner, error = %e, "balance refresh failed, keeping last value");
                Err(e.into())
            }
        }
    }

    pub fn latest(&self) -> Option<Balance> {
        *self.cache.borrow()
    }

    /// Receiver that observes every successful refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<Balance>> {
        self.cache.subscribe()
    }
}
