pub mod handlers;
pub mod logging;
pub mod routes;

use orchestrator::{SessionState, TransferOrchestrator};
use std::sync::Arc;
use tokio::sync::Mutex;
use wallet::WalletSession;

/// Shared application state: the wallet session, the orchestrator and the
/// single in-memory page session.
pub struct AppState {
    pub wallet: Arc<dyn WalletSession>,
    pub orchestrator: Arc<TransferOrchestrator>,
    pub session: Mutex<SessionState>,
}

impl AppState {
    pub fn new(wallet: Arc<dyn WalletSession>, orchestrator: Arc<TransferOrchestrator>) -> Self {
        Self {
            wallet,
            orchestrator,
            session: Mutex::new(SessionState::new()),
        }
    }
}
