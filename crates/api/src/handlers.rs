use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use orchestrator::BalanceView;
use shared::Error;

use crate::AppState;

// Response types
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

// Request types
#[derive(Deserialize)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct SignMessageRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ConnectResponse {
    pub owner: String,
    pub balance: BalanceView,
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub signature: String,
    pub balance: BalanceView,
}

fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::InvalidRecipient(_)
        | Error::InvalidAmount(_)
        | Error::InsufficientBalance(_)
        | Error::InvalidMessage
        | Error::NotConnected => StatusCode::BAD_REQUEST,
        Error::TransferInFlight => StatusCode::CONFLICT,
        Error::AuthorizationUnavailable(_)
        | Error::SubmissionFailed(_)
        | Error::WalletSession(_)
        | Error::LedgerRpc(_) => StatusCode::BAD_GATEWAY,
        Error::Config(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Establish a passkey session and fetch the initial balance
pub async fn connect_wallet(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.wallet.connect().await {
        Ok(owner) => {
            let balance = state.orchestrator.fetch_balance(&owner).await;

            let mut session = state.session.lock().await;
            session.connect(owner.to_string());
            session.apply_balance(balance.clone());

            info!("Wallet connected: {}", owner);
            (
                StatusCode::OK,
                Json(ApiResponse::success(ConnectResponse {
                    owner: owner.to_string(),
                    balance,
                })),
            )
        }
        Err(e) => {
            warn!("Wallet connect failed: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

pub async fn disconnect_wallet(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.wallet.disconnect().await;
    state.session.lock().await.disconnect();

    info!("Wallet session disconnected");
    Json(ApiResponse::success(()))
}

/// Current session view: connection, balance, transient flags, last signature
pub async fn wallet_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await.clone();
    Json(ApiResponse::success(session))
}

/// Recompute and return the aggregated balance
pub async fn get_balance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(owner) = state.wallet.owner().await else {
        let e = Error::NotConnected;
        return (error_status(&e), Json(ApiResponse::error(e.to_string())));
    };

    let balance = state.orchestrator.fetch_balance(&owner).await;
    state.session.lock().await.apply_balance(balance.clone());

    (StatusCode::OK, Json(ApiResponse::success(balance)))
}

/// Validate, prepare and submit a single sponsored transfer
pub async fn send_transfer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransferRequest>,
) -> impl IntoResponse {
    let Some(owner) = state.wallet.owner().await else {
        let e = Error::NotConnected;
        return (error_status(&e), Json(ApiResponse::error(e.to_string())));
    };

    // Gate duplicate submissions; the balance snapshot taken here is the one
    // the preconditions are checked against (accepted race, see orchestrator)
    let current_balance = {
        let mut session = state.session.lock().await;
        if let Err(e) = session.begin_submission() {
            return (error_status(&e), Json(ApiResponse::error(e.to_string())));
        }
        session.balance.amount.clone()
    };

    let prepared = match state
        .orchestrator
        .prepare_transfer(&owner, &request.recipient, &request.amount, &current_balance)
        .await
    {
        Ok(prepared) => prepared,
        Err(e) => {
            state.session.lock().await.fail_submission(e.to_string());
            return (error_status(&e), Json(ApiResponse::error(e.to_string())));
        }
    };

    if prepared.creates_accounts() {
        state.session.lock().await.mark_creating_accounts();
    }

    match state.orchestrator.submit(&prepared).await {
        Ok(signature) => {
            // Refresh strictly after submission confirmation
            let balance = state.orchestrator.fetch_balance(&owner).await;

            let mut session = state.session.lock().await;
            session.complete_submission(signature.clone(), balance.clone());

            (
                StatusCode::OK,
                Json(ApiResponse::success(TransferResponse { signature, balance })),
            )
        }
        Err(e) => {
            warn!("Transfer submission failed: {}", e);
            state.session.lock().await.fail_submission(e.to_string());
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Sign an arbitrary message with the passkey
pub async fn sign_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignMessageRequest>,
) -> impl IntoResponse {
    match state.orchestrator.sign_message(&request.message).await {
        Ok(signed) => (StatusCode::OK, Json(ApiResponse::success(signed))),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(
            error_status(&Error::InvalidAmount("abc".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(error_status(&Error::NotConnected), StatusCode::BAD_REQUEST);
        assert_eq!(error_status(&Error::TransferInFlight), StatusCode::CONFLICT);
        assert_eq!(
            error_status(&Error::SubmissionFailed("timeout".to_string())),
            StatusCode::BAD_GATEWAY
        );
        // Nothing was submitted on an internal failure, so it is not a 502
        assert_eq!(
            error_status(&Error::Internal("bad program id".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
