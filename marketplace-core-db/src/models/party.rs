use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// User-directory projection carrying just what the payout gateway needs to
/// address a person. Resolved at disbursement time; an unresolvable party
/// makes the settlement item a skip, not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyModel {
    pub id: Uuid,
    pub display_name: HeaplessString<100>,
    pub email: HeaplessString<100>,
    pub phone: Option<HeaplessString<20>>,
}

impl Identifiable for PartyModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
