use ledger::{LedgerReader, TokenAccountRecord};
use serde::Serialize;
use shared::Result;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{debug, error, info};

/// USDC uses 6 decimals; records with other decimals never enter the sum
pub const USDC_DECIMALS: u8 = 6;

/// Aggregated balance as shown to the user.
///
/// `detected_mint` is set only when the configured mint matched nothing and
/// the balance comes from an auto-detected USDC-like token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    /// Decimal string with exactly two fractional digits
    pub amount: String,
    pub detected_mint: Option<String>,
}

impl BalanceView {
    pub fn zero() -> Self {
        Self {
            amount: "0.00".to_string(),
            detected_mint: None,
        }
    }
}

/// Aggregates an owner's USDC balance across token accounts
pub struct BalanceAggregator {
    ledger: Arc<dyn LedgerReader>,
    usdc_mint: String,
}

impl BalanceAggregator {
    pub fn new(ledger: Arc<dyn LedgerReader>, usdc_mint: &Pubkey) -> Self {
        Self {
            ledger,
            usdc_mint: usdc_mint.to_string(),
        }
    }

    /// Compute the aggregated USDC balance for `owner`.
    ///
    /// Ledger failures degrade to the zero view and are logged; this never
    /// errors, so a balance refresh can never take the UI down.
    pub async fn compute_balance(&self, owner: &Pubkey) -> BalanceView {
        match self.try_compute(owner).await {
            Ok(view) => view,
            Err(e) => {
                error!("Failed to fetch balance for {}: {}", owner, e);
                BalanceView::zero()
            }
        }
    }

    async fn try_compute(&self, owner: &Pubkey) -> Result<BalanceView> {
        let records = self.ledger.token_accounts_by_owner(owner).await?;
        debug!("Retrieved {} token accounts for {}", records.len(), owner);

        let matching: Vec<&TokenAccountRecord> = records
            .iter()
            .filter(|r| r.mint == self.usdc_mint)
            .collect();

        if !matching.is_empty() {
            return Ok(BalanceView {
                amount: format_base_units(sum_raw(&matching)),
                detected_mint: None,
            });
        }

        // No account matched the configured mint. Fall back to any USDC-like
        // token (6 decimals, positive balance) so a wallet on a different
        // network still shows a plausible balance, with the mint disclosed.
        let candidates: Vec<&TokenAccountRecord> = records
            .iter()
            .filter(|r| r.decimals == USDC_DECIMALS && r.display_amount() > 0.0)
            .collect();

        if candidates.is_empty() {
            return Ok(BalanceView::zero());
        }

        let detected = candidates[0].mint.clone();
        info!("Auto-detected USDC-like token mint: {}", detected);

        Ok(BalanceView {
            amount: format_base_units(sum_raw(&candidates)),
            detected_mint: Some(detected),
        })
    }
}

fn sum_raw(records: &[&TokenAccountRecord]) -> u128 {
    records.iter().map(|r| r.amount as u128).sum()
}

/// Format USDC base units (10^-6 tokens) as a two-decimal string, rounding
/// half up at the cent. Integer arithmetic end to end.
pub fn format_base_units(total: u128) -> String {
    let cents = (total + 5_000) / 10_000;
    format!("{}.{:02}", cents / 100, cents % 100)
}
