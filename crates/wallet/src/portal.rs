use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::session::{SignedMessage, TransactionOptions, WalletSession};

/// Wallet session backed by the passkey portal and the paymaster.
///
/// The portal performs the WebAuthn ceremony and returns the smart wallet
/// address; the paymaster signs-and-sends instruction batches with sponsored
/// fees. Session state lives in memory for the lifetime of the process.
pub struct PortalSession {
    http: Client,
    portal_url: String,
    paymaster_url: String,
    owner: RwLock<Option<Pubkey>>,
}

#[derive(Serialize)]
struct WireAccountMeta {
    pubkey: String,
    is_signer: bool,
    is_writable: bool,
}

#[derive(Serialize)]
struct WireInstruction {
    program_id: String,
    accounts: Vec<WireAccountMeta>,
    /// Instruction data, base64-encoded
    data: String,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    smart_wallet: String,
    instructions: Vec<WireInstruction>,
    #[serde(rename = "transactionOptions")]
    transaction_options: &'a TransactionOptions,
}

#[derive(Deserialize)]
struct SubmitResponse {
    signature: String,
}

#[derive(Deserialize)]
struct ConnectResponse {
    smart_wallet: String,
}

#[derive(Serialize)]
struct SignRequest<'a> {
    smart_wallet: String,
    message: &'a str,
}

fn encode_instruction(ix: &Instruction) -> WireInstruction {
    WireInstruction {
        program_id: ix.program_id.to_string(),
        accounts: ix
            .accounts
            .iter()
            .map(|meta| WireAccountMeta {
                pubkey: meta.pubkey.to_string(),
                is_signer: meta.is_signer,
                is_writable: meta.is_writable,
            })
            .collect(),
        data: BASE64.encode(&ix.data),
    }
}

impl PortalSession {
    pub fn new(portal_url: String, paymaster_url: String) -> Self {
        info!("Initializing portal wallet session: {}", portal_url);

        Self {
            http: Client::new(),
            portal_url: portal_url.trim_end_matches('/').to_string(),
            paymaster_url: paymaster_url.trim_end_matches('/').to_string(),
            owner: RwLock::new(None),
        }
    }

    async fn connected_owner(&self) -> Result<Pubkey> {
        (*self.owner.read().await).ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl WalletSession for PortalSession {
    async fn connect(&self) -> Result<Pubkey> {
        let url = format!("{}/v1/wallet/connect", self.portal_url);

        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::WalletSession(format!("Portal unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::WalletSession(format!(
                "Portal connect failed with status {}",
                response.status()
            )));
        }

        let body: ConnectResponse = response
            .json()
            .await
            .map_err(|e| Error::WalletSession(format!("Invalid portal response: {}", e)))?;

        let owner = Pubkey::from_str(&body.smart_wallet).map_err(|e| {
            Error::WalletSession(format!("Portal returned invalid wallet address: {}", e))
        })?;

        *self.owner.write().await = Some(owner);
        info!("Passkey wallet connected: {}", owner);

        Ok(owner)
    }

    async fn disconnect(&self) {
        if let Some(owner) = self.owner.write().await.take() {
            info!("Passkey wallet disconnected: {}", owner);
        }
    }

    async fn is_connected(&self) -> bool {
        self.owner.read().await.is_some()
    }

    async fn owner(&self) -> Option<Pubkey> {
        *self.owner.read().await
    }

    async fn sign_and_send_transaction(
        &self,
        instructions: &[Instruction],
        options: &TransactionOptions,
    ) -> Result<String> {
        let owner = self.connected_owner().await?;

        debug!(
            "Submitting {} instruction(s) to paymaster for {}",
            instructions.len(),
            owner
        );

        let request = SubmitRequest {
            smart_wallet: owner.to_string(),
            instructions: instructions.iter().map(encode_instruction).collect(),
            transaction_options: options,
        };

        let url = format!("{}/v1/transactions/sign-and-send", self.paymaster_url);
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::WalletSession(format!("Paymaster unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Paymaster rejected submission ({}): {}", status, body);
            return Err(Error::WalletSession(format!(
                "Paymaster rejected submission ({}): {}",
                status, body
            )));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| Error::WalletSession(format!("Invalid paymaster response: {}", e)))?;

        Ok(body.signature)
    }

    async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        let owner = self.connected_owner().await?;

        let request = SignRequest {
            smart_wallet: owner.to_string(),
            message,
        };

        let url = format!("{}/v1/wallet/sign-message", self.portal_url);
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::WalletSession(format!("Portal unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::WalletSession(format!(
                "Portal sign-message failed ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::WalletSession(format!("Invalid portal response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;

    #[test]
    fn encodes_instruction_for_the_wire() {
        let program_id = Pubkey::new_unique();
        let source = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        let ix = Instruction {
            program_id,
            accounts: vec![
                AccountMeta::new(source, false),
                AccountMeta::new_readonly(authority, true),
            ],
            data: vec![3, 0, 1, 2],
        };

        let wire = encode_instruction(&ix);

        assert_eq!(wire.program_id, program_id.to_string());
        assert_eq!(wire.accounts.len(), 2);
        assert!(wire.accounts[0].is_writable);
        assert!(!wire.accounts[0].is_signer);
        assert!(wire.accounts[1].is_signer);
        assert!(!wire.accounts[1].is_writable);
        assert_eq!(BASE64.decode(&wire.data).unwrap(), vec![3, 0, 1, 2]);
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let session = PortalSession::new(
            "https://portal.example.com/".to_string(),
            "https://paymaster.example.com".to_string(),
        );

        assert!(!session.is_connected().await);
        assert!(session.owner().await.is_none());
    }

    #[tokio::test]
    async fn submission_without_session_is_rejected() {
        let session = PortalSession::new(
            "https://portal.example.com".to_string(),
            "https://paymaster.example.com".to_string(),
        );

        let result = session
            .sign_and_send_transaction(&[], &TransactionOptions::gasless_usdc())
            .await;

        assert!(matches!(result, Err(Error::NotConnected)));
    }
}
