use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::Result;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

/// Which asset pays network fees for a sponsored submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeToken {
    #[serde(rename = "USDC")]
    Usdc,
}

/// Fee configuration attached to a sponsored submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOptions {
    #[serde(rename = "feeToken")]
    pub fee_token: FeeToken,
}

impl TransactionOptions {
    /// Gasless submission with fees paid in USDC by the paymaster
    pub fn gasless_usdc() -> Self {
        Self {
            fee_token: FeeToken::Usdc,
        }
    }
}

/// A passkey signature over an arbitrary message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedMessage {
    pub signature: String,
    pub signed_payload: String,
}

/// Passkey wallet session: connect/disconnect, sponsored submission and
/// message signing.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Establish a passkey session and return the smart wallet address
    async fn connect(&self) -> Result<Pubkey>;

    async fn disconnect(&self);

    async fn is_connected(&self) -> bool;

    /// Smart wallet address of the connected session, if any
    async fn owner(&self) -> Option<Pubkey>;

    /// Sign the instruction batch with the passkey and broadcast it in one
    /// atomic step; returns the transaction signature.
    async fn sign_and_send_transaction(
        &self,
        instructions: &[Instruction],
        options: &TransactionOptions,
    ) -> Result<String>;

    async fn sign_message(&self, message: &str) -> Result<SignedMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_options_wire_format() {
        let options = TransactionOptions::gasless_usdc();
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, serde_json::json!({ "feeToken": "USDC" }));
    }
}
