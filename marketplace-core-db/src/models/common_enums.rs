use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Workflow status of a contract. The explicit codes are the legacy wire
/// values; every consumption site matches exhaustively so a new status
/// cannot be silently mishandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum ContractStatus {
    PaymentPending = 1,
    Working = 2,
    TicketRaised = 3,
    TicketClosed = 4,
    Submitted = 5,
    Completed = 6,
    ReworkNeeded = 7,
}

impl ContractStatus {
    pub fn code(&self) -> i16 {
        *self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(ContractStatus::PaymentPending),
            2 => Some(ContractStatus::Working),
            3 => Some(ContractStatus::TicketRaised),
            4 => Some(ContractStatus::TicketClosed),
            5 => Some(ContractStatus::Submitted),
            6 => Some(ContractStatus::Completed),
            7 => Some(ContractStatus::ReworkNeeded),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractStatus::PaymentPending => write!(f, "PaymentPending"),
            ContractStatus::Working => write!(f, "Working"),
            ContractStatus::TicketRaised => write!(f, "TicketRaised"),
            ContractStatus::TicketClosed => write!(f, "TicketClosed"),
            ContractStatus::Submitted => write!(f, "Submitted"),
            ContractStatus::Completed => write!(f, "Completed"),
            ContractStatus::ReworkNeeded => write!(f, "ReworkNeeded"),
        }
    }
}

impl FromStr for ContractStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PaymentPending" => Ok(ContractStatus::PaymentPending),
            "Working" => Ok(ContractStatus::Working),
            "TicketRaised" => Ok(ContractStatus::TicketRaised),
            "TicketClosed" => Ok(ContractStatus::TicketClosed),
            "Submitted" => Ok(ContractStatus::Submitted),
            "Completed" => Ok(ContractStatus::Completed),
            "ReworkNeeded" => Ok(ContractStatus::ReworkNeeded),
            _ => Err(()),
        }
    }
}

pub fn serialize_contract_status<S>(value: &ContractStatus, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i16(value.code())
}

pub fn deserialize_contract_status<'de, D>(deserializer: D) -> Result<ContractStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let code = i16::deserialize(deserializer)?;
    ContractStatus::from_code(code)
        .ok_or_else(|| serde::de::Error::custom(format!("Invalid ContractStatus code: {code}")))
}

/// Settlement flag kept separate from the workflow status: marks whether the
/// final payout for this contract has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum FormStatus {
    Open = 0,
    Closed = 1,
}

impl FormStatus {
    pub fn code(&self) -> i16 {
        *self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(FormStatus::Open),
            1 => Some(FormStatus::Closed),
            _ => None,
        }
    }
}

/// Status of a dispute ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum TicketStatus {
    RefundPending = 1,
    Closed = 2,
    Cancelled = 3,
}

impl TicketStatus {
    pub fn code(&self) -> i16 {
        *self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(TicketStatus::RefundPending),
            2 => Some(TicketStatus::Closed),
            3 => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::RefundPending => write!(f, "RefundPending"),
            TicketStatus::Closed => write!(f, "Closed"),
            TicketStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RefundPending" => Ok(TicketStatus::RefundPending),
            "Closed" => Ok(TicketStatus::Closed),
            "Cancelled" => Ok(TicketStatus::Cancelled),
            _ => Err(()),
        }
    }
}

pub fn serialize_ticket_status<S>(value: &TicketStatus, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i16(value.code())
}

pub fn deserialize_ticket_status<'de, D>(deserializer: D) -> Result<TicketStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let code = i16::deserialize(deserializer)?;
    TicketStatus::from_code(code)
        .ok_or_else(|| serde::de::Error::custom(format!("Invalid TicketStatus code: {code}")))
}

/// Kind of state-changing action recorded in the approval log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum ApprovalAction {
    Rejected = 0,
    Approved = 1,
    AttachmentSubmitted = 2,
}

impl ApprovalAction {
    pub fn code(&self) -> i16 {
        *self as i16
    }
}

/// Direction of a ledger movement relative to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum PaymentType {
    Received = 1,
    Sent = 2,
}

impl PaymentType {
    pub fn code(&self) -> i16 {
        *self as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_status_codes_round_trip() {
        for status in [
            ContractStatus::PaymentPending,
            ContractStatus::Working,
            ContractStatus::TicketRaised,
            ContractStatus::TicketClosed,
            ContractStatus::Submitted,
            ContractStatus::Completed,
            ContractStatus::ReworkNeeded,
        ] {
            assert_eq!(ContractStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ContractStatus::from_code(0), None);
        assert_eq!(ContractStatus::from_code(8), None);
    }

    #[test]
    fn ticket_status_display_round_trip() {
        for status in [
            TicketStatus::RefundPending,
            TicketStatus::Closed,
            TicketStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<TicketStatus>(), Ok(status));
        }
    }
}
