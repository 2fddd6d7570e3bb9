use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::Result;
use solana_sdk::pubkey::Pubkey;

/// A token account with balance information, as reported by the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAccountRecord {
    pub mint: String,
    pub owner: String,
    /// Raw amount in token base units
    pub amount: u64,
    pub decimals: u8,
}

impl TokenAccountRecord {
    /// Raw amount scaled down by the token's decimals
    pub fn display_amount(&self) -> f64 {
        self.amount as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// Minimal view of an on-chain account, enough for existence checks
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub lamports: u64,
    pub owner: Pubkey,
}

/// Read-only ledger access
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// All SPL token accounts owned by `owner` (zero or many, unordered)
    async fn token_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<TokenAccountRecord>>;

    /// Account info for `address`, or `None` if the account does not exist
    async fn account_info(&self, address: &Pubkey) -> Result<Option<AccountSummary>>;
}
