use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::TransactionModel;

/// Repository contract for the append-only ledger.
///
/// The totals here are the source of truth for how much was paid in and
/// paid out per contract; the cached aggregates on the contract are bumped
/// for compatibility but never consulted for reconciliation.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn record(
        &self,
        entry: TransactionModel,
    ) -> Result<TransactionModel, Box<dyn std::error::Error + Send + Sync>>;

    /// All ledger entries for a contract, oldest first.
    async fn list_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<TransactionModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Sum of Received entries for the contract.
    async fn paid_total(
        &self,
        contract_id: Uuid,
    ) -> Result<Decimal, Box<dyn std::error::Error + Send + Sync>>;

    /// Sum of Sent entries for the contract.
    async fn payout_total(
        &self,
        contract_id: Uuid,
    ) -> Result<Decimal, Box<dyn std::error::Error + Send + Sync>>;
}
