use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Role of an authenticated actor. The small-int codes are the wire values
/// used by the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Freelancer,
    Client,
}

impl UserRole {
    pub fn code(&self) -> i16 {
        match self {
            UserRole::Admin => 1,
            UserRole::Freelancer => 2,
            UserRole::Client => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(UserRole::Admin),
            2 => Some(UserRole::Freelancer),
            3 => Some(UserRole::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "Admin"),
            UserRole::Freelancer => write!(f, "Freelancer"),
            UserRole::Client => write!(f, "Client"),
        }
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(UserRole::Admin),
            "Freelancer" => Ok(UserRole::Freelancer),
            "Client" => Ok(UserRole::Client),
            _ => Err(()),
        }
    }
}

/// A verified actor identity produced by the auth gate.
///
/// Disabled or deleted accounts are rejected by the gate itself; an `Actor`
/// handed to a service is always usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}
