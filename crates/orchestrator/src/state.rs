use serde::Serialize;
use shared::{Error, Result};

use crate::balance::BalanceView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Transient user-facing notification (the toast surface)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Info,
        }
    }
}

/// Session and view state for the wallet page, mutated only through the
/// transition methods below.
///
/// `loading` is the duplicate-submission gate: while it is set no second
/// transfer may begin. Every submission outcome clears both transient flags.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub connected: bool,
    pub owner: Option<String>,
    pub balance: BalanceView,
    pub loading: bool,
    pub creating_accounts: bool,
    pub last_signature: Option<String>,
    pub notice: Option<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            connected: false,
            owner: None,
            balance: BalanceView::zero(),
            loading: false,
            creating_accounts: false,
            last_signature: None,
            notice: None,
        }
    }

    pub fn connect(&mut self, owner: String) {
        self.connected = true;
        self.owner = Some(owner);
    }

    pub fn disconnect(&mut self) {
        *self = Self::new();
    }

    pub fn apply_balance(&mut self, balance: BalanceView) {
        self.balance = balance;
    }

    /// Gate a new submission; refuses while another is in flight.
    pub fn begin_submission(&mut self) -> Result<()> {
        if self.loading {
            return Err(Error::TransferInFlight);
        }
        self.loading = true;
        self.notice = None;
        Ok(())
    }

    pub fn mark_creating_accounts(&mut self) {
        self.creating_accounts = true;
        self.notice = Some(Notice::info("Creating associated token account(s)..."));
    }

    pub fn complete_submission(&mut self, signature: String, balance: BalanceView) {
        self.loading = false;
        self.creating_accounts = false;
        self.last_signature = Some(signature);
        self.balance = balance;
        self.notice = Some(Notice::success("Transaction sent successfully!"));
    }

    pub fn fail_submission(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.creating_accounts = false;
        self.notice = Some(Notice::error(message));
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
