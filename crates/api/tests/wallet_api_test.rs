//! HTTP-level tests for the wallet API using in-memory doubles behind the
//! `LedgerReader` / `WalletSession` seams.

use api::{routes::create_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ledger::{AccountSummary, LedgerReader, TokenAccountRecord};
use orchestrator::TransferOrchestrator;
use shared::Result;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tower::ServiceExt;
use wallet::{SignedMessage, TransactionOptions, WalletSession};

struct StubLedger {
    records: Mutex<Vec<TokenAccountRecord>>,
}

#[async_trait]
impl LedgerReader for StubLedger {
    async fn token_accounts_by_owner(&self, _owner: &Pubkey) -> Result<Vec<TokenAccountRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn account_info(&self, _address: &Pubkey) -> Result<Option<AccountSummary>> {
        Ok(None)
    }
}

struct StubWallet {
    target: Pubkey,
    owner: Mutex<Option<Pubkey>>,
}

impl StubWallet {
    fn new() -> Self {
        Self {
            target: Pubkey::new_unique(),
            owner: Mutex::new(None),
        }
    }
}

#[async_trait]
impl WalletSession for StubWallet {
    async fn connect(&self) -> Result<Pubkey> {
        *self.owner.lock().unwrap() = Some(self.target);
        Ok(self.target)
    }

    async fn disconnect(&self) {
        *self.owner.lock().unwrap() = None;
    }

    async fn is_connected(&self) -> bool {
        self.owner.lock().unwrap().is_some()
    }

    async fn owner(&self) -> Option<Pubkey> {
        *self.owner.lock().unwrap()
    }

    async fn sign_and_send_transaction(
        &self,
        _instructions: &[Instruction],
        _options: &TransactionOptions,
    ) -> Result<String> {
        Ok("stub-signature".to_string())
    }

    async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        Ok(SignedMessage {
            signature: format!("signed:{}", message),
            signed_payload: message.to_string(),
        })
    }
}

/// Wallet double whose submissions block until a semaphore permit is released
struct GatedWallet {
    target: Pubkey,
    owner: Mutex<Option<Pubkey>>,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl WalletSession for GatedWallet {
    async fn connect(&self) -> Result<Pubkey> {
        *self.owner.lock().unwrap() = Some(self.target);
        Ok(self.target)
    }

    async fn disconnect(&self) {
        *self.owner.lock().unwrap() = None;
    }

    async fn is_connected(&self) -> bool {
        self.owner.lock().unwrap().is_some()
    }

    async fn owner(&self) -> Option<Pubkey> {
        *self.owner.lock().unwrap()
    }

    async fn sign_and_send_transaction(
        &self,
        _instructions: &[Instruction],
        _options: &TransactionOptions,
    ) -> Result<String> {
        let _permit = self.gate.acquire().await.unwrap();
        Ok("gated-signature".to_string())
    }

    async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        Ok(SignedMessage {
            signature: format!("signed:{}", message),
            signed_payload: message.to_string(),
        })
    }
}

fn build_app(
    wallet: Arc<dyn WalletSession>,
    records: Vec<TokenAccountRecord>,
    mint: Pubkey,
) -> axum::Router {
    let ledger = Arc::new(StubLedger {
        records: Mutex::new(records),
    });
    let orchestrator = Arc::new(TransferOrchestrator::new(ledger, wallet.clone(), mint));
    let state = Arc::new(AppState::new(wallet, orchestrator));

    create_router(state)
}

fn test_app(records: Vec<TokenAccountRecord>, mint: Pubkey) -> axum::Router {
    build_app(Arc::new(StubWallet::new()), records, mint)
}

fn usdc_record(mint: &Pubkey, amount: u64) -> TokenAccountRecord {
    TokenAccountRecord {
        mint: mint.to_string(),
        owner: "owner".to_string(),
        amount,
        decimals: 6,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = test_app(vec![], Pubkey::new_unique());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn transfer_without_session_is_rejected() {
    let app = test_app(vec![], Pubkey::new_unique());

    let response = app
        .oneshot(post_json(
            "/api/transfer",
            r#"{"recipient":"abc","amount":"1.00"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn connect_reports_owner_and_balance() {
    let mint = Pubkey::new_unique();
    let app = test_app(vec![usdc_record(&mint, 2_000_000)], mint);

    let response = app
        .clone()
        .oneshot(post_json("/api/wallet/connect", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["balance"]["amount"], "2.00");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/wallet/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["connected"], true);
    assert_eq!(body["data"]["loading"], false);
}

#[tokio::test]
async fn invalid_amount_rejected_and_session_not_left_loading() {
    let mint = Pubkey::new_unique();
    let app = test_app(vec![usdc_record(&mint, 2_000_000)], mint);

    app.clone()
        .oneshot(post_json("/api/wallet/connect", "{}"))
        .await
        .unwrap();

    let recipient = Pubkey::new_unique();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/transfer",
            &format!(r#"{{"recipient":"{}","amount":"abc"}}"#, recipient),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/wallet/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["loading"], false);
    assert_eq!(body["data"]["notice"]["kind"], "error");
}

#[tokio::test]
async fn successful_transfer_returns_signature() {
    let mint = Pubkey::new_unique();
    let app = test_app(vec![usdc_record(&mint, 2_000_000)], mint);

    app.clone()
        .oneshot(post_json("/api/wallet/connect", "{}"))
        .await
        .unwrap();

    let recipient = Pubkey::new_unique();
    let response = app
        .oneshot(post_json(
            "/api/transfer",
            &format!(r#"{{"recipient":"{}","amount":"1.00"}}"#, recipient),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["signature"], "stub-signature");
}

#[tokio::test]
async fn second_transfer_conflicts_while_one_is_in_flight() {
    let mint = Pubkey::new_unique();
    let gate = Arc::new(Semaphore::new(0));
    let wallet = Arc::new(GatedWallet {
        target: Pubkey::new_unique(),
        owner: Mutex::new(None),
        gate: gate.clone(),
    });
    let app = build_app(wallet, vec![usdc_record(&mint, 2_000_000)], mint);

    app.clone()
        .oneshot(post_json("/api/wallet/connect", "{}"))
        .await
        .unwrap();

    let recipient = Pubkey::new_unique();
    let body = format!(r#"{{"recipient":"{}","amount":"1.00"}}"#, recipient);

    let first = tokio::spawn({
        let app = app.clone();
        let body = body.clone();
        async move { app.oneshot(post_json("/api/transfer", &body)).await.unwrap() }
    });

    // Wait until the first submission holds the in-flight gate
    let mut in_flight = false;
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/wallet/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        if body_json(response).await["data"]["loading"] == true {
            in_flight = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(in_flight);

    let response = app
        .clone()
        .oneshot(post_json("/api/transfer", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    gate.add_permits(1);
    let response = first.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["signature"], "gated-signature");
}

#[tokio::test]
async fn sign_message_round_trip() {
    let app = test_app(vec![], Pubkey::new_unique());

    app.clone()
        .oneshot(post_json("/api/wallet/connect", "{}"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/api/sign-message", r#"{"message":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["signature"], "signed:hello");

    let response = app
        .oneshot(post_json("/api/sign-message", r#"{"message":"  "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
