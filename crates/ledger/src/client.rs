use anyhow::Context;
use async_trait::async_trait;
use shared::{Error, Result};
use solana_account_decoder::UiAccountData;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tracing::{debug, info, warn};

use crate::reader::{AccountSummary, LedgerReader, TokenAccountRecord};

/// Ledger reader backed by a Solana JSON-RPC endpoint
pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    pub fn new(rpc_url: String) -> Self {
        info!("Initializing Solana RPC ledger reader: {}", rpc_url);

        let client = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());

        Self { client }
    }
}

#[async_trait]
impl LedgerReader for RpcLedger {
    async fn token_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<TokenAccountRecord>> {
        debug!("Fetching token accounts for owner: {}", owner);

        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            .map_err(|e| Error::LedgerRpc(format!("get_token_accounts_by_owner failed: {}", e)))?;

        let owner_str = owner.to_string();
        let mut records = Vec::new();

        for keyed in accounts {
            match parse_token_account(&owner_str, &keyed.account.data) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Failed to parse token account {}: {}", keyed.pubkey, e);
                    continue;
                }
            }
        }

        debug!("Retrieved {} token accounts", records.len());
        Ok(records)
    }

    async fn account_info(&self, address: &Pubkey) -> Result<Option<AccountSummary>> {
        match self.client.get_account(address) {
            Ok(account) => Ok(Some(AccountSummary {
                lamports: account.lamports,
                owner: account.owner,
            })),
            Err(e) => {
                let message = e.to_string();
                if is_not_found(&message) {
                    debug!("Account does not exist: {}", address);
                    Ok(None)
                } else {
                    Err(Error::LedgerRpc(format!(
                        "get_account failed for {}: {}",
                        address, message
                    )))
                }
            }
        }
    }
}

/// The RPC surfaces a missing account as an error rather than `None`
fn is_not_found(message: &str) -> bool {
    message.contains("AccountNotFound") || message.contains("could not find account")
}

/// Parse a `jsonParsed` SPL token account into a record
fn parse_token_account(owner: &str, data: &UiAccountData) -> anyhow::Result<TokenAccountRecord> {
    match data {
        UiAccountData::Json(parsed_account) => {
            let info = parsed_account
                .parsed
                .get("info")
                .ok_or_else(|| anyhow::anyhow!("Missing info field"))?;

            let mint = info
                .get("mint")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("Missing mint field"))?
                .to_string();

            let token_amount = info
                .get("tokenAmount")
                .ok_or_else(|| anyhow::anyhow!("Missing tokenAmount field"))?;

            let amount_str = token_amount
                .get("amount")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("Missing amount field"))?;

            let amount = amount_str
                .parse::<u64>()
                .context("Failed to parse amount")?;

            let decimals = token_amount
                .get("decimals")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| anyhow::anyhow!("Missing decimals field"))? as u8;

            Ok(TokenAccountRecord {
                mint,
                owner: owner.to_string(),
                amount,
                decimals,
            })
        }
        _ => anyhow::bail!("Token account data not in jsonParsed format"),
    }
}
