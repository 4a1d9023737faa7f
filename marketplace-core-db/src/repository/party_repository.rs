use async_trait::async_trait;
use uuid::Uuid;

use crate::models::PartyModel;

/// Lookup into the user directory for payout addressing.
#[async_trait]
pub trait PartyRepository: Send + Sync {
    async fn find_party(
        &self,
        id: Uuid,
    ) -> Result<Option<PartyModel>, Box<dyn std::error::Error + Send + Sync>>;
}
