use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use marketplace_core_api::domain::TicketReason;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::common_enums::{
    deserialize_ticket_status, serialize_ticket_status, TicketStatus,
};
use crate::models::identifiable::Identifiable;

/// # Documentation
/// A dispute raised against a contract by either contracted party.
///
/// - The split fractions are computed by the close sweep, not at creation.
/// - Only the scheduled sweep moves a ticket to Closed; operationally at
///   most one RefundPending ticket drives a contract's TicketRaised status,
///   while closed/cancelled tickets remain as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketModel {
    pub id: Uuid,
    pub project_id: Uuid,
    pub bid_id: Uuid,
    pub contract_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,

    /// Earned share paid out to the freelancer, set at close time.
    pub freelancer_percent: Option<Decimal>,
    /// Unearned-but-paid share refunded to the client, set at close time.
    pub client_percent: Option<Decimal>,

    pub reason: TicketReason,
    pub remarks: Option<HeaplessString<500>>,
    pub raised_by: Uuid,
    #[serde(
        serialize_with = "serialize_ticket_status",
        deserialize_with = "deserialize_ticket_status"
    )]
    pub status: TicketStatus,

    pub trashed: bool,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for TicketModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
