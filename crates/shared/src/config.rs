use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub solana: SolanaConfig,
    pub wallet: WalletConfig,
    pub token: TokenConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaConfig {
    pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Passkey portal endpoint (connect / sign-message)
    pub portal_url: String,
    /// Fee-sponsorship endpoint (sign-and-send)
    pub paymaster_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// Base58 mint address of the USDC token to aggregate and transfer
    pub usdc_mint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            solana: SolanaConfig {
                rpc_url: env::var("SOLANA_RPC_URL")?,
            },
            wallet: WalletConfig {
                portal_url: env::var("WALLET_PORTAL_URL")?,
                paymaster_url: env::var("PAYMASTER_URL")?,
            },
            token: TokenConfig {
                usdc_mint: env::var("USDC_MINT")?,
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?,
            },
        })
    }
}
