use crate::domain::Actor;
use crate::error::ApiResult;
use async_trait::async_trait;

/// Black-box capability gate. Verifies a bearer credential and resolves the
/// acting identity; disabled or soft-deleted accounts are rejected here, so
/// downstream services never re-check account state.
#[async_trait]
pub trait AuthGate: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> ApiResult<Actor>;
}
