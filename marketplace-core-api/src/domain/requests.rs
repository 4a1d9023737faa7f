use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Validates that a decimal percentage lies in the inclusive 0..=100 range.
pub fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::from(100) {
        return Err(ValidationError::new("percentage_out_of_range"));
    }
    Ok(())
}

fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive"));
    }
    Ok(())
}

/// A file uploaded alongside a milestone submission. The storage path is
/// produced by the (out-of-scope) upload handler before the request reaches
/// this core.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadedFile {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    pub size_bytes: u64,
    #[validate(length(min = 1, max = 500))]
    pub storage_path: String,
}

/// Freelancer submits deliverables for one milestone percentage.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitMilestoneRequest {
    pub contract_id: Uuid,
    #[validate(custom(function = validate_percentage))]
    pub percentage: Decimal,
    #[validate(length(max = 500))]
    pub remarks: String,
    /// Attachments at this milestone to keep; everything else at the same
    /// (contract, percentage) pair is superseded.
    pub kept_attachment_ids: Vec<Uuid>,
    #[validate(nested)]
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Client reviews the milestone currently under submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewMilestoneRequest {
    pub contract_id: Uuid,
    pub decision: ReviewDecision,
    #[validate(length(max = 500))]
    pub remarks: String,
}

/// Client invoices a payment against the contract.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitPaymentRequest {
    pub contract_id: Uuid,
    #[validate(custom(function = validate_positive_amount))]
    pub amount: Decimal,
    #[validate(custom(function = validate_percentage))]
    pub percentage: Decimal,
}

/// Why a dispute was raised against a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketReason {
    IncompleteWork,
    QualityIssue,
    MissedDeadline,
    Other,
}

impl TicketReason {
    pub fn code(&self) -> i16 {
        match self {
            TicketReason::IncompleteWork => 1,
            TicketReason::QualityIssue => 2,
            TicketReason::MissedDeadline => 3,
            TicketReason::Other => 4,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(TicketReason::IncompleteWork),
            2 => Some(TicketReason::QualityIssue),
            3 => Some(TicketReason::MissedDeadline),
            4 => Some(TicketReason::Other),
            _ => None,
        }
    }
}

/// Either contracted party opens a dispute.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpenTicketRequest {
    pub contract_id: Uuid,
    pub reason: TicketReason,
    #[validate(length(max = 500))]
    pub remarks: String,
}
