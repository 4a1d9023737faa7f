//! Payment recording: a client invoices part of the budget, which lands in
//! the ledger and unblocks further work.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use marketplace_core_api::domain::SubmitPaymentRequest;
use marketplace_core_api::{ApiError, ApiResult};
use marketplace_core_db::models::{ContractModel, ContractStatus, PaymentType, TransactionModel};
use marketplace_core_db::repository::{ContractRepository, TransactionRepository};

pub struct PaymentService {
    contracts: Arc<dyn ContractRepository>,
    ledger: Arc<dyn TransactionRepository>,
}

impl PaymentService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        ledger: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self { contracts, ledger }
    }

    /// Record a payment against the contract: one Received ledger entry,
    /// then the cached aggregates. A contract waiting on payment goes back
    /// to Working.
    pub async fn submit_payment(&self, request: SubmitPaymentRequest) -> ApiResult<ContractModel> {
        request
            .validate()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;

        let contract = self
            .contracts
            .find_by_id(request.contract_id)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract {}", request.contract_id)))?;

        self.ledger
            .record(TransactionModel {
                id: Uuid::new_v4(),
                project_id: contract.project_id,
                bid_id: contract.bid_id,
                contract_id: contract.id,
                amount: request.amount,
                payment_person: contract.client_id,
                payment_type: PaymentType::Received,
                payout_id: None,
                created_at: Utc::now(),
            })
            .await
            .map_err(ApiError::database)?;

        let updated = self
            .contracts
            .record_payment(contract.id, request.amount, request.percentage)
            .await
            .map_err(ApiError::database)?;

        if contract.status == ContractStatus::PaymentPending {
            return self
                .contracts
                .set_status(contract.id, ContractStatus::Working)
                .await
                .map_err(ApiError::database);
        }
        Ok(updated)
    }

    /// Total paid in for the contract, derived from the ledger rather than
    /// the cached aggregate on the contract.
    pub async fn ledger_paid_total(&self, contract_id: Uuid) -> ApiResult<Decimal> {
        self.ledger
            .paid_total(contract_id)
            .await
            .map_err(ApiError::database)
    }
}
