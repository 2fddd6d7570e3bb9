use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Wallet session
        .route("/api/wallet/connect", post(handlers::connect_wallet))
        .route("/api/wallet/disconnect", post(handlers::disconnect_wallet))
        .route("/api/wallet/status", get(handlers::wallet_status))
        // Balance & transfers
        .route("/api/balance", get(handlers::get_balance))
        .route("/api/transfer", post(handlers::send_transfer))
        // Message signing
        .route("/api/sign-message", post(handlers::sign_message))
        .with_state(state)
}
