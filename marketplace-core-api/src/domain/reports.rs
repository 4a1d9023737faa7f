use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel payout id recorded on ledger entries written while real payouts
/// are operationally disabled.
pub const SKIPPED_PAYOUT_ID: &str = "skipped-payouts";

/// Outcome class for one item processed by a scheduled sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepItemStatus {
    Success,
    Skipped,
    Failed,
}

/// Which side of the contract a disbursement leg pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutParty {
    Freelancer,
    Client,
}

impl std::fmt::Display for PayoutParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoutParty::Freelancer => write!(f, "freelancer"),
            PayoutParty::Client => write!(f, "client"),
        }
    }
}

/// Per-contract result of the payout settlement sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementOutcome {
    pub contract_id: Uuid,
    pub status: SweepItemStatus,
    pub reason: Option<String>,
    pub payout_id: Option<String>,
}

impl SettlementOutcome {
    pub fn success(contract_id: Uuid, payout_id: impl Into<String>) -> Self {
        Self {
            contract_id,
            status: SweepItemStatus::Success,
            reason: None,
            payout_id: Some(payout_id.into()),
        }
    }

    pub fn skipped(contract_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            contract_id,
            status: SweepItemStatus::Skipped,
            reason: Some(reason.into()),
            payout_id: None,
        }
    }

    pub fn failed(contract_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            contract_id,
            status: SweepItemStatus::Failed,
            reason: Some(reason.into()),
            payout_id: None,
        }
    }
}

/// Result of one disbursement leg (freelancer payout or client refund)
/// attempted while closing a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutLegOutcome {
    pub party: PayoutParty,
    pub status: SweepItemStatus,
    pub reason: Option<String>,
    pub payout_id: Option<String>,
}

/// Per-ticket result of the dispute-close sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSweepOutcome {
    pub ticket_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub status: SweepItemStatus,
    pub reason: Option<String>,
    pub legs: Vec<PayoutLegOutcome>,
}
