//! Runs one user operation at a time through
//! Building -> Signing -> Submitting -> Confirmed | Failed -> Idle.
//!
//! The only suspension points are the three network calls: the blockhash
//! fetch, the send, and the post-confirmation balance refresh. A second
//! submit while one is in flight is rejected immediately with
//! [`VaultError::OperationInProgress`]; it never queues.
//!
//! Once a transaction has been handed to the network, the rest of the run
//! (send, terminal status, refresh) happens on a spawned task, so dropping
//! the caller's future cannot leave the store stuck in `Submitting`.
//! Dropping it earlier abandons the run and the store returns to `Idle`.
//!
//! The in-flight permit is released as soon as `Confirmed` or `Failed` is
//! published. The post-confirmation refresh runs outside it and the store
//! returns to `Idle` afterwards unless a newer operation has started.

use std::sync::Arc;

use chain_sol::{Instruction, Message, Pubkey, Signer, Transaction};
use tokio::sync::{broadcast, watch, Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::balance::{Balance, BalanceTracker};
use crate::error::VaultError;
use crate::instruction::{self, DepositAccounts, PlaceBidAccounts};
use crate::operation::Operation;
use crate::program::VaultProgram;
use crate::rpc::{RpcClient, RpcError};
use crate::status::{balance_error_message, StatusStore, TransactionStatus};

pub struct TransactionOrchestrator {
    signer: Arc<dyn Signer>,
    program: VaultProgram,
    rpc: Arc<dyn RpcClient>,
    balance: Arc<BalanceTracker>,
    status: Arc<StatusStore>,
    in_flight: Arc<Mutex<()>>,
}

impl TransactionOrchestrator {
    pub fn new(signer: Arc<dyn Signer>, program: VaultProgram, rpc: Arc<dyn RpcClient>) -> Self {
        let balance = Arc::new(BalanceTracker::new(rpc.clone(), signer.pubkey()));
        Self {
            signer,
            program,
            rpc,
            balance,
            status: Arc::new(StatusStore::new()),
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Log the wallet in and fetch its balance once.
    ///
    /// A failed fetch is not fatal: the cache simply stays empty.
    pub async fn start(&self) -> Option<Balance> {
        info!(address = %self.address(), program = %self.program.id(), "team vault client started");
        match self.balance.refresh().await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("{}", balance_error_message(&e));
                None
            }
        }
    }

    pub fn address(&self) -> Pubkey {
        self.signer.pubkey()
    }

    pub fn program(&self) -> &VaultProgram {
        &self.program
    }

    pub fn balance(&self) -> &BalanceTracker {
        &self.balance
    }

    pub fn status(&self) -> TransactionStatus {
        self.status.current()
    }

    pub fn last_outcome(&self) -> Option<TransactionStatus> {
        self.status.last_outcome()
    }

    /// Ordered stream of every status transition.
    pub fn subscribe(&self) -> broadcast::Receiver<TransactionStatus> {
        self.status.subscribe()
    }

    pub fn watch_status(&self) -> watch::Receiver<TransactionStatus> {
        self.status.watch()
    }

    /// Run `operation` to a terminal state and return its transaction id.
    pub async fn submit(&self, operation: Operation) -> Result<String, VaultError> {
        let permit = self.in_flight.clone().try_lock_owned().map_err(|_| {
            warn!(?operation, "rejected: another operation is in progress");
            VaultError::OperationInProgress
        })?;
        let run = Run::begin(self.status.clone(), permit, operation);

        let instructions = match self.build_instructions(&operation) {
            Ok(instructions) => instructions,
            Err(e) => return Err(run.fail(e)),
        };

        run.advance(TransactionStatus::Signing);
        let transaction = match self.sign(&instructions).await {
            Ok(transaction) => transaction,
            Err(e) => return Err(run.fail(e)),
        };
        let wire = match transaction.serialize() {
            Ok(wire) => wire,
            Err(e) => return Err(run.fail(e.into())),
        };
        let local_id = transaction.id();

        run.advance(TransactionStatus::Submitting);
        let rpc = self.rpc.clone();
        let balance = self.balance.clone();
        let status = self.status.clone();
        let submission = tokio::spawn(async move {
            match rpc.send_transaction(&wire).await {
                Ok(signature) => {
                    info!(%signature, ?operation, "transaction accepted");
                    if local_id.as_deref() != Some(signature.as_str()) {
                        warn!(%signature, local = ?local_id, "node returned a different transaction id");
                    }
                    let outcome = run.confirm(signature.clone());
                    // Stale balance is acceptable; the refresh logs its own failure.
                    let _ = balance.refresh().await;
                    status.return_to_idle(&outcome);
                    Ok(signature)
                }
                Err(e) => Err(run.fail(e.into())),
            }
        });

        match submission.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(VaultError::Network(RpcError::Transport(format!(
                "submission task cancelled: {e}"
            )))),
        }
    }

    /// Derive the accounts for `operation` and encode its instruction.
    pub fn build_instructions(&self, operation: &Operation) -> Result<Vec<Instruction>, VaultError> {
        operation.validate()?;

        let wallet = self.signer.pubkey();
        let program_id = self.program.id();
        let team = self.program.team_address(&wallet, operation.team_id())?;

        let instruction = match *operation {
            Operation::Deposit { lamports, .. } => {
                let vault = self.program.vault_address(&team.address)?;
                debug!(team = %team.address, vault = %vault.address, lamports, "deposit accounts");
                instruction::deposit(
                    program_id,
                    &DepositAccounts {
                        team: team.address,
                        vault: vault.address,
                        depositor: wallet,
                        authority: wallet,
                    },
                    lamports,
                )?
            }
            Operation::PlaceBid {
                task_id, lamports, ..
            } => {
                let task = self.program.task_address(&team.address, task_id)?;
                debug!(team = %team.address, task = %task.address, lamports, "bid accounts");
                instruction::place_bid(
                    program_id,
                    &PlaceBidAccounts {
                        team: team.address,
                        task: task.address,
                        bidder: wallet,
                    },
                    lamports,
                )?
            }
        };

        Ok(vec![instruction])
    }

    async fn sign(&self, instructions: &[Instruction]) -> Result<Transaction, VaultError> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let message = Message::compile(instructions, &self.signer.pubkey(), blockhash)?;
        let transaction = Transaction::new_signed(message, &[&*self.signer])?;
        debug!(id = ?transaction.id(), "transaction signed");
        Ok(transaction)
    }
}

/// Holds the in-flight permit for one operation and owns its status updates.
///
/// Dropped without reaching a terminal state, it resets the store to `Idle`
/// before releasing the permit.
struct Run {
    status: Arc<StatusStore>,
    settled: bool,
    // Fields drop after `Drop::drop`, so the permit outlives the Idle publish.
    _permit: OwnedMutexGuard<()>,
}

impl Run {
    fn begin(status: Arc<StatusStore>, permit: OwnedMutexGuard<()>, operation: Operation) -> Self {
        info!(?operation, "operation started");
        status.publish(TransactionStatus::Building);
        Self {
            status,
            settled: false,
            _permit: permit,
        }
    }

    fn advance(&self, status: TransactionStatus) {
        self.status.publish(status);
    }

    /// Publish `Confirmed` and release the permit.
    fn confirm(mut self, signature: String) -> TransactionStatus {
        let outcome = TransactionStatus::Confirmed(signature);
        self.status.publish(outcome.clone());
        self.settled = true;
        outcome
    }

    fn fail(mut self, error: VaultError) -> VaultError {
        warn!(%error, retryable = error.is_retryable(), "operation failed");
        self.status.publish(TransactionStatus::Failed(error.to_string()));
        self.settled = true;
        self.status.publish(TransactionStatus::Idle);
        error
    }
}

impl Drop for Run {
    fn drop(&mut self) {
        if !self.settled {
            debug!("operation abandoned before submission");
            self.status.publish(TransactionStatus::Idle);
        }
    }
}
