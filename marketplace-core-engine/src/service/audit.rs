use chrono::Utc;
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use marketplace_core_api::domain::UserRole;
use marketplace_core_db::models::{ApprovalAction, ContractApprovalLogModel};

/// Builds an approval-log entry with its integrity hash populated.
pub(crate) fn new_log_entry(
    contract_id: Uuid,
    percentage: Decimal,
    action: ApprovalAction,
    remarks: Option<HeaplessString<500>>,
    acted_by: Uuid,
    acted_role: UserRole,
    attachment_count: Option<u32>,
) -> ContractApprovalLogModel {
    let mut entry = ContractApprovalLogModel {
        id: Uuid::new_v4(),
        contract_id,
        percentage,
        action,
        remarks,
        acted_by,
        acted_role,
        attachment_count,
        integrity_hash: 0,
        created_at: Utc::now(),
    };
    match entry.compute_integrity_hash() {
        Ok(hash) => entry.integrity_hash = hash,
        Err(e) => warn!(%contract_id, "failed to hash approval log entry: {e}"),
    }
    entry
}
