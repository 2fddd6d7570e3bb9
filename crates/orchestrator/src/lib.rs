//! Transfer orchestrator: balance aggregation and sponsored-transfer
//! preparation for a passkey smart wallet.
//!
//! The orchestrator owns no network code of its own. It reads the chain
//! through [`ledger::LedgerReader`] and submits through
//! [`wallet::WalletSession`]; both are injected, so tests run against
//! in-memory doubles.

pub mod balance;
pub mod state;
pub mod transfer;

pub use balance::{BalanceAggregator, BalanceView, USDC_DECIMALS};
pub use state::{Notice, NoticeKind, SessionState};
pub use transfer::{PreparedTransfer, TransferOrchestrator};
