use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Message must not be empty")]
    InvalidMessage,

    #[error("Signing failed: passkey authorization unavailable (check TLS / secure context): {0}")]
    AuthorizationUnavailable(String),

    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("A transfer is already in flight")]
    TransferInFlight,

    #[error("No wallet session connected")]
    NotConnected,

    #[error("Ledger RPC error: {0}")]
    LedgerRpc(String),

    #[error("Wallet session error: {0}")]
    WalletSession(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_detail() {
        let err = Error::InvalidRecipient("not-base58".to_string());
        assert!(err.to_string().contains("not-base58"));

        let err = Error::InsufficientBalance("requested 5.00, available 2.00".to_string());
        assert!(err.to_string().contains("available 2.00"));
    }

    #[test]
    fn authorization_error_mentions_secure_context() {
        let err = Error::AuthorizationUnavailable("WebAuthn unavailable".to_string());
        assert!(err.to_string().contains("TLS / secure context"));
    }
}
