//! Observable lifecycle of the current operation.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::error::VaultError;
use crate::instruction::InstructionKind;

const EVENT_CAPACITY: usize = 64;

/// Shown before any operation has run and between operations.
pub const IDLE_MESSAGE: &str = "Ready to connect";

/// Shown when the signing identity cannot be restored at startup.
pub const WALLET_ERROR_MESSAGE: &str = "Wallet Error";

/// Shown when a balance refresh fails. The cached balance is kept.
pub fn balance_error_message(error: &VaultError) -> String {
    format!("Balance Error: {error}")
}

/// Where the in-flight operation is.
///
/// Exactly one status is current at a time. `Confirmed` and `Failed` are
/// terminal and are followed by `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    #[default]
    Idle,
    Building,
    Signing,
    Submitting,
    /// Carries the transaction id (Base58 signature).
    Confirmed(String),
    /// Carries a human-readable reason.
    Failed(String),
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Confirmed(_) | TransactionStatus::Failed(_))
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Building | TransactionStatus::Signing | TransactionStatus::Submitting
        )
    }

    /// User-facing text for this status while running an operation of `kind`.
    pub fn message(&self, kind: InstructionKind) -> String {
        match self {
            TransactionStatus::Idle => IDLE_MESSAGE.to_string(),
            TransactionStatus::Building
            | TransactionStatus::Signing
            | TransactionStatus::Submitting => match kind {
                InstructionKind::Deposit => "Depositing...".to_string(),
                InstructionKind::PlaceBid => "Placing Bid...".to_string(),
            },
            TransactionStatus::Confirmed(tx) => match kind {
                InstructionKind::Deposit => format!("Success! Tx: {}...", short_id(tx)),
                InstructionKind::PlaceBid => format!("Bid Placed! Tx: {}...", short_id(tx)),
            },
            TransactionStatus::Failed(reason) => match kind {
                InstructionKind::Deposit => format!("Deposit Failed: {reason}"),
                InstructionKind::PlaceBid => format!("Bid Failed: {reason}"),
            },
        }
    }
}

fn short_id(tx: &str) -> &str {
    tx.char_indices().nth(8).map_or(tx, |(i, _)| &tx[..i])
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Idle => f.write_str("idle"),
            TransactionStatus::Building => f.write_str("building"),
            TransactionStatus::Signing => f.write_str("signing"),
            TransactionStatus::Submitting => f.write_str("submitting"),
            TransactionStatus::Confirmed(tx) => write!(f, "confirmed ({tx})"),
            TransactionStatus::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Publishes status transitions.
///
/// Two views: `watch` for "what is current now" and `broadcast` for the
/// ordered stream of every transition (slow receivers may lag).
pub struct StatusStore {
    current: watch::Sender<TransactionStatus>,
    last_outcome: watch::Sender<Option<TransactionStatus>>,
    events: broadcast::Sender<TransactionStatus>,
    // Keeps `current` and `events` in the same order across threads.
    order: Mutex<()>,
}

impl StatusStore {
    pub fn new() -> Self {
        let (current, _) = watch::channel(TransactionStatus::Idle);
        let (last_outcome, _) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current,
            last_outcome,
            events,
            order: Mutex::new(()),
        }
    }

    pub fn publish(&self, status: TransactionStatus) {
        let _order = self.lock();
        self.send(status);
    }

    /// Publish `Idle` if `outcome` is still the current status.
    ///
    /// Returns `false` when another operation has already moved the store
    /// on, in which case nothing is published.
    pub fn return_to_idle(&self, outcome: &TransactionStatus) -> bool {
        let _order = self.lock();
        if *self.current.borrow() != *outcome {
            debug!(expected = %outcome, "store moved on, not returning to idle");
            return false;
        }
        self.send(TransactionStatus::Idle);
        true
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.order.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, status: TransactionStatus) {
        debug!(stage = %status, "status transition");
        if status.is_terminal() {
            self.last_outcome.send_replace(Some(status.clone()));
        }
        self.current.send_replace(status.clone());
        // No subscribers is fine.
        let _ = self.events.send(status);
    }

    pub fn current(&self) -> TransactionStatus {
        self.current.borrow().clone()
    }

    /// The most recent `Confirmed` or `Failed`, if any.
    pub fn last_outcome(&self) -> Option<TransactionStatus> {
        self.last_outcome.borrow().clone()
    }

    /// Every transition from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<TransactionStatus> {
        self.events.subscribe()
    }

    /// The current status, for callers that only care about the latest value.
    pub fn watch(&self) -> watch::Receiver<TransactionStatus> {
        self.current.subscribe()
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}
