//! Payout settlement sweep: pays out contracts that reached 100% approved
//! completion and closes their settlement flag.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use marketplace_core_api::domain::SettlementOutcome;
use marketplace_core_api::{ApiError, ApiResult};
use marketplace_core_db::models::ContractModel;
use marketplace_core_db::repository::ContractRepository;

use crate::config::SettlementConfig;
use crate::service::disbursement::{DisburseOutcome, Disburser};

pub struct SettlementJob {
    contracts: Arc<dyn ContractRepository>,
    disburser: Arc<Disburser>,
    config: SettlementConfig,
}

impl SettlementJob {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        disburser: Arc<Disburser>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            contracts,
            disburser,
            config,
        }
    }

    /// One settlement pass. Missing credentials abort the whole run before
    /// any contract is touched; after that, each contract settles (or fails)
    /// on its own without affecting its siblings.
    pub async fn release_due_payouts(&self) -> ApiResult<Vec<SettlementOutcome>> {
        self.config
            .require_credentials()
            .map_err(|reason| ApiError::ConfigurationError(reason.to_string()))?;

        let due = self
            .contracts
            .find_due_for_settlement()
            .await
            .map_err(ApiError::database)?;

        let outcomes = join_all(due.into_iter().map(|c| self.settle_contract(c))).await;
        let failed = outcomes
            .iter()
            .filter(|o| o.status == marketplace_core_api::domain::SweepItemStatus::Failed)
            .count();
        info!(total = outcomes.len(), failed, "settlement sweep finished");
        Ok(outcomes)
    }

    async fn settle_contract(&self, contract: ContractModel) -> SettlementOutcome {
        match self
            .contracts
            .try_claim_settlement(contract.id, chrono::Utc::now())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return SettlementOutcome::skipped(
                    contract.id,
                    "settlement already claimed or closed",
                )
            }
            Err(e) => {
                return SettlementOutcome::failed(
                    contract.id,
                    format!("settlement claim failed: {e}"),
                )
            }
        }

        let key = format!("{}-settlement", contract.id);
        match self
            .disburser
            .disburse(&contract, contract.freelancer_id, contract.budget, &key)
            .await
        {
            Ok(DisburseOutcome::Paid { payout_id }) => {
                if let Err(e) = self.contracts.settle(contract.id, None).await {
                    error!(contract_id = %contract.id, "settle write failed after payout: {e}");
                    return SettlementOutcome::failed(
                        contract.id,
                        format!("settle write failed after payout {payout_id}: {e}"),
                    );
                }
                SettlementOutcome::success(contract.id, payout_id)
            }
            Ok(DisburseOutcome::Skipped { reason }) => {
                self.release_claim(&contract).await;
                SettlementOutcome::skipped(contract.id, reason)
            }
            Err(e) => {
                self.release_claim(&contract).await;
                SettlementOutcome::failed(contract.id, e.to_string())
            }
        }
    }

    /// Give the lease back so the next pass reconsiders the contract.
    async fn release_claim(&self, contract: &ContractModel) {
        if let Err(e) = self.contracts.release_settlement_claim(contract.id).await {
            warn!(contract_id = %contract.id, "settlement claim release failed: {e}");
        }
    }
}
