//! Passkey wallet session interface.
//!
//! [`WalletSession`] is the seam to the external passkey-wallet SDK: the
//! portal holds the passkey credential and the paymaster sponsors fees.
//! Production wires [`PortalSession`], tests substitute an in-memory double.

pub mod portal;
pub mod session;

pub use portal::PortalSession;
pub use session::{FeeToken, SignedMessage, TransactionOptions, WalletSession};
