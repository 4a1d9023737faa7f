use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::common_enums::PaymentType;
use crate::models::identifiable::Identifiable;

/// # Documentation
/// One money movement in the append-only ledger.
///
/// The sum of a contract's entries is the source of truth for total
/// paid/payout amounts, independent of the cached aggregates on the
/// contract itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionModel {
    pub id: Uuid,
    pub project_id: Uuid,
    pub bid_id: Uuid,
    pub contract_id: Uuid,

    pub amount: Decimal,
    /// The human counterpart of the movement (payer for Received, payee for
    /// Sent).
    pub payment_person: Uuid,
    pub payment_type: PaymentType,
    /// Gateway payout id for Sent entries, or the skipped-payouts sentinel
    /// when real payouts are disabled.
    pub payout_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Identifiable for TransactionModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
