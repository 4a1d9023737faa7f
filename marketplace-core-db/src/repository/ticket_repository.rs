use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::TicketModel;

/// Repository contract for dispute tickets.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(
        &self,
        ticket: TicketModel,
    ) -> Result<TicketModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Load a ticket by id, erroring when it does not exist.
    async fn load(&self, id: Uuid) -> Result<TicketModel, Box<dyn std::error::Error + Send + Sync>>;

    /// The RefundPending ticket currently driving the contract's disputed
    /// state, if any.
    async fn find_open_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Option<TicketModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// RefundPending tickets created before the cutoff, oldest first.
    async fn find_expired_open(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<TicketModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Close the ticket, recording the split computed from the contract's
    /// completion and paid percentages.
    async fn close_with_split(
        &self,
        id: Uuid,
        freelancer_percent: Decimal,
        client_percent: Decimal,
    ) -> Result<TicketModel, Box<dyn std::error::Error + Send + Sync>>;
}
