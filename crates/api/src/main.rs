use anyhow::{Context, Result};
use api::{routes::create_router, AppState};
use ledger::RpcLedger;
use orchestrator::TransferOrchestrator;
use shared::Config;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use wallet::{PortalSession, WalletSession};

#[tokio::main]
async fn main() -> Result<()> {
    api::logging::init_logging();

    tracing::info!("Starting passkey wallet transfer service");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let usdc_mint = Pubkey::from_str(&config.token.usdc_mint)
        .with_context(|| format!("Invalid USDC_MINT address: {}", config.token.usdc_mint))?;

    // Ledger reader over the configured RPC endpoint
    let ledger = Arc::new(RpcLedger::new(config.solana.rpc_url.clone()));
    tracing::info!("Ledger reader initialized");

    // Passkey wallet session via portal + paymaster
    let wallet: Arc<dyn WalletSession> = Arc::new(PortalSession::new(
        config.wallet.portal_url.clone(),
        config.wallet.paymaster_url.clone(),
    ));
    tracing::info!("Portal wallet session initialized");

    let orchestrator = Arc::new(TransferOrchestrator::new(
        ledger,
        wallet.clone(),
        usdc_mint,
    ));
    tracing::info!("Transfer orchestrator initialized (mint: {})", usdc_mint);

    let state = Arc::new(AppState::new(wallet, orchestrator));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
