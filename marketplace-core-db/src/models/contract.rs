use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::common_enums::{
    deserialize_contract_status, serialize_contract_status, ContractStatus, FormStatus,
};
use crate::models::identifiable::Identifiable;

/// # Documentation
/// An accepted bid between a client (the contract creator) and a freelancer
/// for a posted project.
///
/// - `completion_percentage` is the last milestone the client approved;
///   `temp_completion_percentage` is the milestone the freelancer has claimed
///   and is only meaningful while status is Submitted or ReworkNeeded.
/// - `paid_amount`/`paid_percentage` are cached aggregates bumped on each
///   payment submission; the ledger is the source of truth for totals.
/// - `form_status` is the settlement flag, independent of workflow status.
/// - Contracts are never physically deleted; `trashed` soft-deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractModel {
    pub id: Uuid,
    pub project_id: Uuid,
    pub bid_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,

    /// Agreed budget, currency-agnostic.
    pub budget: Decimal,
    pub paid_amount: Decimal,
    pub paid_percentage: Decimal,
    pub completion_percentage: Decimal,
    pub temp_completion_percentage: Decimal,

    pub remarks: Option<HeaplessString<500>>,
    #[serde(
        serialize_with = "serialize_contract_status",
        deserialize_with = "deserialize_contract_status"
    )]
    pub status: ContractStatus,
    pub form_status: FormStatus,

    /// Lease taken by a settlement sweep before payout work begins, so an
    /// overlapping run cannot pick up the same contract.
    pub settlement_claimed_at: Option<DateTime<Utc>>,

    pub trashed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for ContractModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl ContractModel {
    /// A contract is due for final settlement when fully complete and its
    /// settlement flag is still open.
    pub fn is_due_for_settlement(&self) -> bool {
        !self.trashed
            && self.form_status == FormStatus::Open
            && self.completion_percentage == Decimal::from(100)
    }
}
