//! Payout gateway protocol: contact → fund account → payout.

pub mod http;

pub use http::HttpPayoutGateway;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the payout gateway. A recognized conflict response is
/// not an error; it is resolved to the existing resource id inside the
/// client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway call timed out")]
    Timeout,

    #[error("gateway transport error: {0}")]
    Transport(String),

    #[error("gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// Who a payout leg is addressed to, projected from the user directory.
#[derive(Debug, Clone)]
pub struct PayoutRecipient {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// The three-step payout protocol shared by the settlement job and the
/// ticket sweep. Contact and fund-account creation are create-or-reuse: a
/// conflict response yields the existing id. Payout creation is not
/// idempotent at the gateway, so callers pass a deterministic idempotency
/// key and the client forwards it with the request.
#[async_trait]
pub trait PayoutGateway: Send + Sync {
    /// Create or reuse a contact keyed by the recipient's identity.
    async fn ensure_contact(&self, recipient: &PayoutRecipient) -> Result<String, GatewayError>;

    /// Create or reuse a fund account for the contact.
    async fn ensure_fund_account(&self, contact_id: &str) -> Result<String, GatewayError>;

    /// Create a payout of `amount_minor` minor currency units to the fund
    /// account. Queued by the gateway when the settlement account balance
    /// is insufficient.
    async fn create_payout(
        &self,
        fund_account_id: &str,
        amount_minor: i64,
        reference: &str,
        idempotency_key: &str,
    ) -> Result<String, GatewayError>;
}
