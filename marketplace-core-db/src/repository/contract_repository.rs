use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{ContractModel, ContractStatus};

/// Repository contract for the contract collection.
///
/// All mutations are single-document updates; there is no cross-document
/// transaction. The settlement claim operations exist so a sweep can take a
/// per-contract lease before starting payout work, keeping an overlapping
/// run from double-processing the same contract.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Load a contract by id, erroring when it does not exist.
    async fn load(&self, id: Uuid) -> Result<ContractModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Find a contract by id.
    ///
    /// # Returns
    /// * `Ok(Some(ContractModel))` - The found contract
    /// * `Ok(None)` - If the contract does not exist
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContractModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Insert a new contract (bid acceptance happens outside this core, but
    /// fixtures and the accepting flow both come through here).
    async fn create(
        &self,
        contract: ContractModel,
    ) -> Result<ContractModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Record a milestone submission: status Submitted, freelancer remarks,
    /// and the claimed (temporary) completion percentage, in one write.
    async fn record_submission(
        &self,
        id: Uuid,
        remarks: Option<HeaplessString<500>>,
        percentage: Decimal,
    ) -> Result<ContractModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Apply a review outcome: remarks, the selected completion percentage
    /// and the resulting status, atomically.
    async fn apply_review(
        &self,
        id: Uuid,
        remarks: Option<HeaplessString<500>>,
        completion_percentage: Decimal,
        status: ContractStatus,
    ) -> Result<ContractModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Bump the cached paid aggregates after a payment submission.
    async fn record_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        percentage: Decimal,
    ) -> Result<ContractModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Overwrite the workflow status.
    async fn set_status(
        &self,
        id: Uuid,
        status: ContractStatus,
    ) -> Result<ContractModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Contracts at 100% completion whose settlement flag is still open.
    async fn find_due_for_settlement(
        &self,
    ) -> Result<Vec<ContractModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Atomically take the settlement lease for a contract.
    ///
    /// # Returns
    /// * `Ok(true)` - The lease was taken by this caller
    /// * `Ok(false)` - The contract is already claimed or already settled
    async fn try_claim_settlement(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Release the settlement lease so the next sweep reconsiders the
    /// contract.
    async fn release_settlement_claim(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Mark the contract settled: settlement flag Closed, lease cleared,
    /// and optionally a final workflow status in the same write.
    async fn settle(
        &self,
        id: Uuid,
        status: Option<ContractStatus>,
    ) -> Result<ContractModel, Box<dyn std::error::Error + Send + Sync>>;
}
