//! Shared disbursement path for the settlement job and the ticket sweep.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use marketplace_core_api::{ApiError, ApiResult, SKIPPED_PAYOUT_ID};
use marketplace_core_db::models::{ContractModel, PartyModel, PaymentType, TransactionModel};
use marketplace_core_db::repository::{PartyRepository, TransactionRepository};

use crate::gateway::{PayoutGateway, PayoutRecipient};

/// Result of one disbursement attempt. Skips are non-errors: the item is
/// simply not payable in this run.
#[derive(Debug, Clone)]
pub enum DisburseOutcome {
    Paid { payout_id: String },
    Skipped { reason: String },
}

/// Drives one payout leg: eligibility checks, the contact → fund-account →
/// payout protocol (or the disabled-payout sentinel), and the ledger write.
pub struct Disburser {
    gateway: Arc<dyn PayoutGateway>,
    parties: Arc<dyn PartyRepository>,
    ledger: Arc<dyn TransactionRepository>,
    payouts_enabled: bool,
}

impl Disburser {
    pub fn new(
        gateway: Arc<dyn PayoutGateway>,
        parties: Arc<dyn PartyRepository>,
        ledger: Arc<dyn TransactionRepository>,
        payouts_enabled: bool,
    ) -> Self {
        Self {
            gateway,
            parties,
            ledger,
            payouts_enabled,
        }
    }

    /// Pay `amount` to `payee` against `contract`. Rounds to cents at this
    /// boundary, not before.
    pub async fn disburse(
        &self,
        contract: &ContractModel,
        payee: Uuid,
        amount: Decimal,
        idempotency_key: &str,
    ) -> ApiResult<DisburseOutcome> {
        let amount = amount.round_dp(2);
        if amount <= Decimal::ZERO {
            return Ok(DisburseOutcome::Skipped {
                reason: format!("non-positive payout amount: {amount}"),
            });
        }

        let party = self
            .parties
            .find_party(payee)
            .await
            .map_err(ApiError::database)?;
        let party = match party {
            Some(party) => party,
            None => {
                return Ok(DisburseOutcome::Skipped {
                    reason: format!("payee {payee} not found in user directory"),
                })
            }
        };

        if !self.payouts_enabled {
            debug!(contract_id = %contract.id, %payee, "payouts disabled, recording sentinel ledger entry");
            self.record_ledger_entry(contract, payee, amount, SKIPPED_PAYOUT_ID)
                .await?;
            return Ok(DisburseOutcome::Paid {
                payout_id: SKIPPED_PAYOUT_ID.to_string(),
            });
        }

        let recipient = recipient_of(&party);
        let contact_id = self
            .gateway
            .ensure_contact(&recipient)
            .await
            .map_err(|e| ApiError::GatewayError(e.to_string()))?;
        let fund_account_id = self
            .gateway
            .ensure_fund_account(&contact_id)
            .await
            .map_err(|e| ApiError::GatewayError(e.to_string()))?;

        let amount_minor = to_minor_units(amount).ok_or_else(|| {
            ApiError::InternalError(format!("amount out of range for minor units: {amount}"))
        })?;
        let payout_id = self
            .gateway
            .create_payout(
                &fund_account_id,
                amount_minor,
                &contract.id.to_string(),
                idempotency_key,
            )
            .await
            .map_err(|e| ApiError::GatewayError(e.to_string()))?;

        self.record_ledger_entry(contract, payee, amount, &payout_id)
            .await?;
        info!(contract_id = %contract.id, %payee, %payout_id, %amount, "payout recorded");
        Ok(DisburseOutcome::Paid { payout_id })
    }

    async fn record_ledger_entry(
        &self,
        contract: &ContractModel,
        payee: Uuid,
        amount: Decimal,
        payout_id: &str,
    ) -> ApiResult<()> {
        self.ledger
            .record(TransactionModel {
                id: Uuid::new_v4(),
                project_id: contract.project_id,
                bid_id: contract.bid_id,
                contract_id: contract.id,
                amount,
                payment_person: payee,
                payment_type: PaymentType::Sent,
                payout_id: Some(payout_id.to_string()),
                created_at: Utc::now(),
            })
            .await
            .map_err(ApiError::database)?;
        Ok(())
    }
}

fn recipient_of(party: &PartyModel) -> PayoutRecipient {
    PayoutRecipient {
        user_id: party.id,
        name: party.display_name.to_string(),
        email: party.email.to_string(),
        phone: party.phone.as_ref().map(|p| p.to_string()),
    }
}

/// Converts a cent-rounded decimal amount into minor currency units.
fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100)).round().to_i64()
}
