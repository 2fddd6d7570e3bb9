//! Read-only ledger access for the transfer orchestrator.
//!
//! The [`LedgerReader`] trait is the seam between the orchestrator and the
//! chain: production wires the RPC-backed [`RpcLedger`], tests substitute an
//! in-memory double.

pub mod client;
pub mod reader;

pub use client::RpcLedger;
pub use reader::{AccountSummary, LedgerReader, TokenAccountRecord};
