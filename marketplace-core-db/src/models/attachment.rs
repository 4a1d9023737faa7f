use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// # Documentation
/// A deliverable file tied to one milestone of one contract.
///
/// For a given (contract, milestone_percentage) pair the non-trashed rows
/// are the current deliverable set; resubmitting the milestone trashes the
/// rows not explicitly kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractAttachmentModel {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub project_id: Uuid,
    pub bid_id: Uuid,

    pub filename: HeaplessString<255>,
    /// Derived from the filename at insert time; empty when the filename has
    /// no extension.
    pub extension: HeaplessString<20>,
    /// File size in KiB, rounded to 2 decimals.
    pub size_kib: Decimal,
    pub milestone_percentage: Decimal,
    pub storage_path: HeaplessString<500>,

    pub freelancer_remarks: Option<HeaplessString<500>>,
    pub client_remarks: Option<HeaplessString<500>>,

    pub trashed: bool,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for ContractAttachmentModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
