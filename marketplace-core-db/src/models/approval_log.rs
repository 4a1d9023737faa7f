use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use marketplace_core_api::domain::UserRole;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::common_enums::ApprovalAction;
use crate::models::identifiable::Identifiable;

/// # Documentation
/// Append-only audit record of one state-changing action on a contract.
///
/// - One entry per approve/reject/submit action, immutable once written.
/// - `integrity_hash` is the entry hashed with the hash field set to 0,
///   providing tamper detection on the trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractApprovalLogModel {
    pub id: Uuid,
    pub contract_id: Uuid,

    /// Milestone percentage at the time of the action.
    pub percentage: Decimal,
    pub action: ApprovalAction,
    pub remarks: Option<HeaplessString<500>>,

    pub acted_by: Uuid,
    pub acted_role: UserRole,
    /// Active attachments at the milestone, recorded for submissions.
    pub attachment_count: Option<u32>,

    pub integrity_hash: i64,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for ContractApprovalLogModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl ContractApprovalLogModel {
    /// Computes the integrity hash over the entry with `integrity_hash`
    /// zeroed, mirroring how the hash is verified later.
    pub fn compute_integrity_hash(&self) -> Result<i64, String> {
        let mut zeroed = self.clone();
        zeroed.integrity_hash = 0;
        crate::utils::hash_as_i64(&zeroed)
    }
}
