use ledger::LedgerReader;
use shared::{Error, Result};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address;
use spl_token::instruction as token_instruction;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};
use wallet::{SignedMessage, TransactionOptions, WalletSession};

use crate::balance::{BalanceAggregator, BalanceView, USDC_DECIMALS};

/// Instruction batch for one sponsored transfer: creation instructions for
/// missing associated accounts (if any) ahead of the single transfer.
#[derive(Debug)]
pub struct PreparedTransfer {
    instructions: Vec<Instruction>,
    creates_sender_account: bool,
    creates_recipient_account: bool,
}

impl PreparedTransfer {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn creates_sender_account(&self) -> bool {
        self.creates_sender_account
    }

    pub fn creates_recipient_account(&self) -> bool {
        self.creates_recipient_account
    }

    /// True when the batch has to create at least one associated account
    pub fn creates_accounts(&self) -> bool {
        self.creates_sender_account || self.creates_recipient_account
    }
}

/// Validates transfer requests, assembles sponsored instruction batches and
/// submits them through the wallet session.
pub struct TransferOrchestrator {
    ledger: Arc<dyn LedgerReader>,
    wallet: Arc<dyn WalletSession>,
    aggregator: BalanceAggregator,
    usdc_mint: Pubkey,
}

impl TransferOrchestrator {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        wallet: Arc<dyn WalletSession>,
        usdc_mint: Pubkey,
    ) -> Self {
        let aggregator = BalanceAggregator::new(ledger.clone(), &usdc_mint);

        Self {
            ledger,
            wallet,
            aggregator,
            usdc_mint,
        }
    }

    /// Aggregated USDC balance for `owner`; degrades to zero on ledger errors
    pub async fn fetch_balance(&self, owner: &Pubkey) -> BalanceView {
        self.aggregator.compute_balance(owner).await
    }

    /// Validate the request and assemble the ordered instruction list.
    ///
    /// Validation happens strictly before any ledger call: a rejected request
    /// never touches the network. `current_balance` is the last balance shown
    /// to the user; checking against it is an accepted race (the submission
    /// itself is the source of truth).
    pub async fn prepare_transfer(
        &self,
        owner: &Pubkey,
        recipient: &str,
        amount: &str,
        current_balance: &str,
    ) -> Result<PreparedTransfer> {
        let recipient = Pubkey::from_str(recipient)
            .map_err(|e| Error::InvalidRecipient(format!("{}: {}", recipient, e)))?;

        let value = parse_amount(amount)?;

        let available: f64 = current_balance.parse().unwrap_or(0.0);
        if value > available {
            return Err(Error::InsufficientBalance(format!(
                "requested {}, available {}",
                amount, current_balance
            )));
        }

        let raw_amount = to_base_units(value);

        // ATA derivation is pure; only the existence checks hit the ledger
        let sender_ata = get_associated_token_address(owner, &self.usdc_mint);
        let recipient_ata = get_associated_token_address(&recipient, &self.usdc_mint);

        let mut instructions = Vec::new();

        let creates_sender_account = self.ledger.account_info(&sender_ata).await?.is_none();
        if creates_sender_account {
            info!("Sender token account missing, will create: {}", sender_ata);
            instructions.push(
                spl_associated_token_account::instruction::create_associated_token_account(
                    owner, // Payer (fees are sponsored, the account rent is not)
                    owner,
                    &self.usdc_mint,
                    &spl_token::id(),
                ),
            );
        }

        let creates_recipient_account = self.ledger.account_info(&recipient_ata).await?.is_none();
        if creates_recipient_account {
            info!(
                "Recipient token account missing, will create: {}",
                recipient_ata
            );
            instructions.push(
                spl_associated_token_account::instruction::create_associated_token_account(
                    owner,
                    &recipient,
                    &self.usdc_mint,
                    &spl_token::id(),
                ),
            );
        }

        let transfer_instruction = token_instruction::transfer(
            &spl_token::id(),
            &sender_ata,
            &recipient_ata,
            owner,
            &[],
            raw_amount,
        )
        .map_err(|e| Error::Internal(format!("Failed to build transfer instruction: {}", e)))?;
        instructions.push(transfer_instruction);

        debug!(
            "Prepared transfer of {} base units in {} instruction(s)",
            raw_amount,
            instructions.len()
        );

        Ok(PreparedTransfer {
            instructions,
            creates_sender_account,
            creates_recipient_account,
        })
    }

    /// Sign and broadcast the prepared batch with sponsored fees.
    ///
    /// Atomic from the caller's point of view: either a signature comes back
    /// or a classified error. Never retried automatically.
    pub async fn submit(&self, prepared: &PreparedTransfer) -> Result<String> {
        match self
            .wallet
            .sign_and_send_transaction(
                prepared.instructions(),
                &TransactionOptions::gasless_usdc(),
            )
            .await
        {
            Ok(signature) => {
                info!("Transaction sent: {}", signature);
                Ok(signature)
            }
            Err(e) => Err(classify_submission_error(e)),
        }
    }

    /// Sign an arbitrary message with the passkey
    pub async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        if message.trim().is_empty() {
            return Err(Error::InvalidMessage);
        }

        self.wallet
            .sign_message(message)
            .await
            .map_err(classify_submission_error)
    }
}

/// Parse a user-supplied decimal amount; must be a finite positive number
fn parse_amount(amount: &str) -> Result<f64> {
    let value: f64 = amount
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAmount(amount.to_string()))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidAmount(amount.to_string()));
    }

    Ok(value)
}

/// Convert a decimal USDC amount to base units, rounding down
fn to_base_units(value: f64) -> u64 {
    (value * 10f64.powi(USDC_DECIMALS as i32)).floor() as u64
}

/// Distinguish missing passkey authorization (WebAuthn / secure-context
/// problems) from generic submission failures, mirroring the messages the
/// portal and paymaster produce.
fn classify_submission_error(err: Error) -> Error {
    // Re-wrap the bare message, not the already-prefixed Display
    let message = match err {
        Error::WalletSession(msg) => msg,
        other => other.to_string(),
    };
    let lowered = message.to_lowercase();

    if lowered.contains("webauthn")
        || lowered.contains("notallowederror")
        || lowered.contains("tls certificate")
    {
        Error::AuthorizationUnavailable(message)
    } else {
        Error::SubmissionFailed(message)
    }
}
