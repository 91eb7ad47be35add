//! Command-line front end for the team vault client.
//!
//! Settings come from `TEAM_VAULT_*` environment variables (a `.env` file is
//! loaded if present). The recovery phrase is read from
//! `TEAM_VAULT_MNEMONIC` or `--mnemonic`.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use team_vault::{
    balance_error_message, InstructionKind, Operation, TransactionOrchestrator,
    TransactionStatus, VaultConfig, VaultProgram, WALLET_ERROR_MESSAGE,
};
use wallet_core::{generate_mnemonic, DerivationPath, WalletIdentity};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recovery phrase of the signing wallet
    #[arg(long, global = true, env = "TEAM_VAULT_MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    /// Optional BIP-39 passphrase
    #[arg(long, global = true, env = "TEAM_VAULT_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh 24-word recovery phrase and show its address
    NewWallet,
    /// Print the wallet address
    Address,
    /// Fetch and print the wallet balance
    Balance,
    /// Deposit SOL into a team vault
    Deposit {
        #[arg(long)]
        team_id: u64,
        /// Amount in SOL, e.g. 1.5
        #[arg(long)]
        amount: String,
    },
    /// Place a bid on a team task
    Bid {
        #[arg(long)]
        team_id: u64,
        #[arg(long)]
        task_id: u64,
        #[arg(long)]
        lamports: u64,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = VaultConfig::from_env()?;
    debug!(rpc_url = %config.rpc_url, program = %config.program_id, "configuration loaded");

    if let Commands::NewWallet = cli.command {
        return new_wallet(&config.derivation_path);
    }

    let wallet = restore_wallet(&cli, &config.derivation_path).inspect_err(|_| {
        println!("{WALLET_ERROR_MESSAGE}");
    })?;
    if let Commands::Address = cli.command {
        println!("{}", wallet.address());
        return Ok(());
    }

    let rpc = Arc::new(config.rpc_client()?);
    let client = TransactionOrchestrator::new(
        Arc::new(wallet),
        VaultProgram::new(config.program_id),
        rpc,
    );

    match cli.command {
        Commands::Balance => match client.balance().refresh().await {
            Ok(balance) => println!("{}", balance.summary()),
            Err(e) => {
                println!("{}", balance_error_message(&e));
                return Err(e.into());
            }
        },
        Commands::Deposit { team_id, amount } => {
            submit(&client, Operation::deposit_sol(team_id, &amount)?).await?;
        }
        Commands::Bid {
            team_id,
            task_id,
            lamports,
        } => {
            let operation = Operation::PlaceBid {
                team_id,
                task_id,
                lamports,
            };
            submit(&client, operation).await?;
        }
        Commands::NewWallet | Commands::Address => {}
    }
    Ok(())
}

fn new_wallet(path: &DerivationPath) -> CliResult<()> {
    let phrase = generate_mnemonic()?;
    let words: Vec<&str> = phrase.split(' ').collect();
    let wallet = WalletIdentity::from_words(&words, "", path)?;

    println!("Recovery phrase (write it down, it is shown once):");
    println!("{}", phrase.as_str());
    println!("Address ({path}): {}", wallet.address());
    Ok(())
}

fn restore_wallet(cli: &Cli, path: &DerivationPath) -> CliResult<WalletIdentity> {
    let phrase = cli
        .mnemonic
        .clone()
        .map(SecretString::from)
        .ok_or("no recovery phrase: set TEAM_VAULT_MNEMONIC or pass --mnemonic")?;
    let passphrase = SecretString::from(cli.passphrase.clone().unwrap_or_default());
    Ok(WalletIdentity::from_phrase(&phrase, &passphrase, path)?)
}

/// Submit and print every status transition until the run settles.
async fn submit(client: &TransactionOrchestrator, operation: Operation) -> CliResult<()> {
    let mut events = client.subscribe();
    let kind = operation.kind();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TransactionStatus::Idle) | Err(RecvError::Closed) => break,
                Ok(status) => print_status(&status, kind),
                Err(RecvError::Lagged(_)) => continue,
            }
        }
    });

    let outcome = client.submit(operation).await;
    printer.await?;

    let signature = outcome?;
    println!("{signature}");
    Ok(())
}

fn print_status(status: &TransactionStatus, kind: InstructionKind) {
    match status {
        // Building, Signing and Submitting share one message.
        TransactionStatus::Building => println!("{}", status.message(kind)),
        s if s.is_in_flight() => debug!(stage = %s, "status"),
        TransactionStatus::Idle => {}
        _ => println!("{}", status.message(kind)),
    }
}
