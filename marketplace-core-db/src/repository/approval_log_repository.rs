use async_trait::async_trait;
use uuid::Uuid;

use crate::models::ContractApprovalLogModel;

/// Repository contract for the append-only approval audit trail. Entries
/// are immutable once written; there is no update or delete.
#[async_trait]
pub trait ApprovalLogRepository: Send + Sync {
    async fn append(
        &self,
        entry: ContractApprovalLogModel,
    ) -> Result<ContractApprovalLogModel, Box<dyn std::error::Error + Send + Sync>>;

    /// All entries for a contract, newest first.
    async fn trail_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<ContractApprovalLogModel>, Box<dyn std::error::Error + Send + Sync>>;
}
