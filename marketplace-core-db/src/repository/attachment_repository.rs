use async_trait::async_trait;
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::ContractAttachmentModel;

/// Repository contract for milestone deliverables.
///
/// The non-trashed rows at a (contract, percentage) pair are the current
/// deliverable set for that milestone.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn insert_many(
        &self,
        attachments: Vec<ContractAttachmentModel>,
    ) -> Result<Vec<ContractAttachmentModel>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_active_by_milestone(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
    ) -> Result<Vec<ContractAttachmentModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Soft-delete every active attachment at the milestone whose id is not
    /// in `kept_ids`. Returns the number of rows trashed.
    async fn trash_superseded(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
        kept_ids: &[Uuid],
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Overwrite freelancer remarks on the kept attachments at the
    /// milestone. Returns the number of rows updated.
    async fn update_freelancer_remarks(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
        kept_ids: &[Uuid],
        remarks: Option<HeaplessString<500>>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Apply reviewer remarks to every active attachment at the milestone.
    async fn set_client_remarks(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
        remarks: Option<HeaplessString<500>>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Count the active attachments at the milestone.
    async fn count_active(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}
