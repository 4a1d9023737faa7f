//! Dispute tickets: opening freezes the contract, a daily sweep closes
//! expired tickets with a split payout between the parties.

use chrono::{NaiveTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use marketplace_core_api::domain::{
    Actor, OpenTicketRequest, PayoutLegOutcome, PayoutParty, SweepItemStatus, TicketSweepOutcome,
};
use marketplace_core_api::service::Notifier;
use marketplace_core_api::{ApiError, ApiResult};
use marketplace_core_db::models::{ContractModel, ContractStatus, TicketModel, TicketStatus};
use marketplace_core_db::repository::{ContractRepository, TicketRepository};
use marketplace_core_db::utils::to_optional_heapless;

use crate::config::SettlementConfig;
use crate::service::disbursement::{DisburseOutcome, Disburser};

pub struct TicketService {
    tickets: Arc<dyn TicketRepository>,
    contracts: Arc<dyn ContractRepository>,
    disburser: Arc<Disburser>,
    notifier: Arc<dyn Notifier>,
    config: SettlementConfig,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        contracts: Arc<dyn ContractRepository>,
        disburser: Arc<Disburser>,
        notifier: Arc<dyn Notifier>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            tickets,
            contracts,
            disburser,
            notifier,
            config,
        }
    }

    /// Open a dispute against a contract. The contract is frozen in
    /// TicketRaised until the scheduled sweep resolves the ticket.
    pub async fn open_ticket(
        &self,
        request: OpenTicketRequest,
        actor: Actor,
    ) -> ApiResult<TicketModel> {
        request
            .validate()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;

        let contract = self
            .contracts
            .find_by_id(request.contract_id)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract {}", request.contract_id)))?;

        if let Some(open) = self
            .tickets
            .find_open_for_contract(contract.id)
            .await
            .map_err(ApiError::database)?
        {
            return Err(ApiError::ValidationError(format!(
                "contract already has an open ticket: {}",
                open.id
            )));
        }

        let ticket = self
            .tickets
            .create(TicketModel {
                id: Uuid::new_v4(),
                project_id: contract.project_id,
                bid_id: contract.bid_id,
                contract_id: contract.id,
                client_id: contract.client_id,
                freelancer_id: contract.freelancer_id,
                freelancer_percent: None,
                client_percent: None,
                reason: request.reason,
                remarks: to_optional_heapless::<500>(&request.remarks)
                    .map_err(ApiError::ValidationError)?,
                raised_by: actor.id,
                status: TicketStatus::RefundPending,
                trashed: false,
                created_at: Utc::now(),
            })
            .await
            .map_err(ApiError::database)?;

        self.contracts
            .set_status(contract.id, ContractStatus::TicketRaised)
            .await
            .map_err(ApiError::database)?;

        self.notify_opened(&contract, &ticket, actor).await;
        Ok(ticket)
    }

    async fn notify_opened(&self, contract: &ContractModel, ticket: &TicketModel, actor: Actor) {
        let url = format!("/tickets/{}", ticket.id);
        if let Err(e) = self
            .notifier
            .notify_admins("Dispute raised", "A contract dispute needs attention", &url)
            .await
        {
            warn!(ticket_id = %ticket.id, "admin notification failed: {e}");
        }
        // the party who did not raise the ticket
        let counterpart = if actor.id == contract.freelancer_id {
            contract.client_id
        } else {
            contract.freelancer_id
        };
        if let Err(e) = self
            .notifier
            .notify(
                &[counterpart],
                "Dispute raised",
                "A dispute was raised on your contract",
                &url,
            )
            .await
        {
            warn!(ticket_id = %ticket.id, "counterpart notification failed: {e}");
        }
    }

    /// Scheduled sweep: close every RefundPending ticket older than the
    /// 1-day cooling-off window, paying each party its share. Individual
    /// ticket failures are recorded and never abort sibling tickets or the
    /// sweep itself.
    pub async fn close_expired_tickets(&self) -> Vec<TicketSweepOutcome> {
        // end of "yesterday": everything created before today's UTC midnight
        let cutoff = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let expired = match self.tickets.find_expired_open(cutoff).await {
            Ok(expired) => expired,
            Err(e) => {
                error!("expired ticket query failed: {e}");
                return Vec::new();
            }
        };

        let outcomes = join_all(expired.into_iter().map(|t| self.close_ticket(t))).await;
        let failed = outcomes
            .iter()
            .filter(|o| o.status == SweepItemStatus::Failed)
            .count();
        info!(total = outcomes.len(), failed, "ticket sweep finished");
        outcomes
    }

    async fn close_ticket(&self, ticket: TicketModel) -> TicketSweepOutcome {
        let contract = match self.contracts.find_by_id(ticket.contract_id).await {
            Ok(Some(contract)) => contract,
            Ok(None) => {
                return failure(
                    &ticket,
                    None,
                    format!("contract {} not found", ticket.contract_id),
                )
            }
            Err(e) => return failure(&ticket, None, format!("contract lookup failed: {e}")),
        };

        // unearned-but-paid share goes back to the client
        let freelancer_percent = contract.completion_percentage;
        let client_percent = contract.paid_percentage - freelancer_percent;

        if let Err(e) = self
            .tickets
            .close_with_split(ticket.id, freelancer_percent, client_percent)
            .await
        {
            return failure(&ticket, Some(contract.id), format!("ticket close failed: {e}"));
        }

        if let Err(reason) = self.config.require_credentials() {
            return failure(&ticket, Some(contract.id), reason.to_string());
        }

        match self.contracts.try_claim_settlement(contract.id, Utc::now()).await {
            Ok(true) => {}
            Ok(false) => {
                return failure(
                    &ticket,
                    Some(contract.id),
                    "contract settlement already in progress".to_string(),
                )
            }
            Err(e) => {
                return failure(&ticket, Some(contract.id), format!("settlement claim failed: {e}"))
            }
        }

        let hundred = Decimal::from(100);
        let legs = vec![
            self.disburse_leg(
                &ticket,
                &contract,
                PayoutParty::Freelancer,
                contract.freelancer_id,
                contract.budget * freelancer_percent / hundred,
            )
            .await,
            self.disburse_leg(
                &ticket,
                &contract,
                PayoutParty::Client,
                contract.client_id,
                contract.budget * client_percent / hundred,
            )
            .await,
        ];

        // settled after attempting both payouts, regardless of leg outcomes
        let mut status = if legs.iter().any(|l| l.status == SweepItemStatus::Failed) {
            SweepItemStatus::Failed
        } else {
            SweepItemStatus::Success
        };
        let mut reason = None;
        if let Err(e) = self
            .contracts
            .settle(contract.id, Some(ContractStatus::TicketClosed))
            .await
        {
            error!(contract_id = %contract.id, "settlement flag write failed: {e}");
            status = SweepItemStatus::Failed;
            reason = Some(format!("settlement flag write failed: {e}"));
        }

        TicketSweepOutcome {
            ticket_id: ticket.id,
            contract_id: Some(contract.id),
            status,
            reason,
            legs,
        }
    }

    async fn disburse_leg(
        &self,
        ticket: &TicketModel,
        contract: &ContractModel,
        party: PayoutParty,
        payee: Uuid,
        amount: Decimal,
    ) -> PayoutLegOutcome {
        let idempotency_key = format!("{}-{party}", ticket.id);
        match self
            .disburser
            .disburse(contract, payee, amount, &idempotency_key)
            .await
        {
            Ok(DisburseOutcome::Paid { payout_id }) => PayoutLegOutcome {
                party,
                status: SweepItemStatus::Success,
                reason: None,
                payout_id: Some(payout_id),
            },
            Ok(DisburseOutcome::Skipped { reason }) => PayoutLegOutcome {
                party,
                status: SweepItemStatus::Skipped,
                reason: Some(reason),
                payout_id: None,
            },
            Err(e) => PayoutLegOutcome {
                party,
                status: SweepItemStatus::Failed,
                reason: Some(e.to_string()),
                payout_id: None,
            },
        }
    }
}

fn failure(ticket: &TicketModel, contract_id: Option<Uuid>, reason: String) -> TicketSweepOutcome {
    warn!(ticket_id = %ticket.id, "ticket sweep item failed: {reason}");
    TicketSweepOutcome {
        ticket_id: ticket.id,
        contract_id,
        status: SweepItemStatus::Failed,
        reason: Some(reason),
        legs: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayCredentials;
    use crate::store::MemoryStore;
    use crate::test_support::{fixtures, MockGateway, RecordingNotifier};
    use chrono::Duration;
    use marketplace_core_api::domain::{TicketReason, UserRole, SKIPPED_PAYOUT_ID};
    use marketplace_core_db::models::{FormStatus, PaymentType};
    use marketplace_core_db::repository::TransactionRepository;

    struct Setup {
        store: Arc<MemoryStore>,
        gateway: Arc<MockGateway>,
        notifier: Arc<RecordingNotifier>,
        service: TicketService,
    }

    fn setup(payouts_enabled: bool, with_credentials: bool) -> Setup {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let config = SettlementConfig {
            credentials: with_credentials.then(|| GatewayCredentials {
                key_id: "key".to_string(),
                key_secret: "secret".to_string(),
            }),
            payouts_enabled,
            ..SettlementConfig::default()
        };
        let disburser = Arc::new(Disburser::new(
            gateway.clone(),
            store.clone(),
            store.clone(),
            payouts_enabled,
        ));
        let service = TicketService::new(
            store.clone(),
            store.clone(),
            disburser,
            notifier.clone(),
            config,
        );
        Setup {
            store,
            gateway,
            notifier,
            service,
        }
    }

    /// A disputed contract: budget 1000, 40% approved, 70% paid.
    async fn disputed_contract(store: &Arc<MemoryStore>) -> ContractModel {
        let mut contract = fixtures::contract();
        contract.completion_percentage = Decimal::from(40);
        contract.paid_percentage = Decimal::from(70);
        contract.status = ContractStatus::TicketRaised;
        let contract = ContractRepository::create(store.as_ref(), contract)
            .await
            .unwrap();
        store.insert_party(fixtures::party(contract.freelancer_id));
        store.insert_party(fixtures::party(contract.client_id));
        contract
    }

    async fn expired_ticket(store: &Arc<MemoryStore>, contract: &ContractModel) -> TicketModel {
        let mut ticket = fixtures::open_ticket(contract);
        ticket.created_at = Utc::now() - Duration::days(2);
        TicketRepository::create(store.as_ref(), ticket)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_ticket_freezes_contract_and_notifies_counterpart() {
        let s = setup(true, true);
        let contract = ContractRepository::create(s.store.as_ref(), fixtures::contract())
            .await
            .unwrap();

        let ticket = s
            .service
            .open_ticket(
                OpenTicketRequest {
                    contract_id: contract.id,
                    reason: TicketReason::QualityIssue,
                    remarks: "not as agreed".to_string(),
                },
                Actor {
                    id: contract.client_id,
                    role: UserRole::Client,
                },
            )
            .await
            .unwrap();

        assert_eq!(ticket.status, TicketStatus::RefundPending);
        assert_eq!(ticket.freelancer_id, contract.freelancer_id);
        let frozen = ContractRepository::load(s.store.as_ref(), contract.id).await.unwrap();
        assert_eq!(frozen.status, ContractStatus::TicketRaised);
        assert_eq!(s.notifier.admin_notifications.lock().len(), 1);
        // client raised it, so the freelancer is notified
        assert_eq!(
            s.notifier.notifications.lock()[0].0,
            vec![contract.freelancer_id]
        );
    }

    #[tokio::test]
    async fn second_open_ticket_is_rejected() {
        let s = setup(true, true);
        let contract = ContractRepository::create(s.store.as_ref(), fixtures::contract())
            .await
            .unwrap();
        let request = OpenTicketRequest {
            contract_id: contract.id,
            reason: TicketReason::Other,
            remarks: String::new(),
        };
        let actor = Actor {
            id: contract.freelancer_id,
            role: UserRole::Freelancer,
        };

        s.service.open_ticket(request.clone(), actor).await.unwrap();
        let result = s.service.open_ticket(request, actor).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn split_payout_follows_completion_and_paid_percentages() {
        let s = setup(true, true);
        let contract = disputed_contract(&s.store).await;
        let ticket = expired_ticket(&s.store, &contract).await;

        let outcomes = s.service.close_expired_tickets().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, SweepItemStatus::Success);

        let closed = TicketRepository::load(s.store.as_ref(), ticket.id)
            .await
            .unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert_eq!(closed.freelancer_percent, Some(Decimal::from(40)));
        assert_eq!(closed.client_percent, Some(Decimal::from(30)));

        // budget 1000: 400.00 to the freelancer, 300.00 to the client
        let payouts = s.gateway.payouts.lock().clone();
        let minors: Vec<i64> = payouts.iter().map(|p| p.amount_minor).collect();
        assert_eq!(minors, vec![40_000, 30_000]);

        let settled = ContractRepository::load(s.store.as_ref(), contract.id).await.unwrap();
        assert_eq!(settled.form_status, FormStatus::Closed);
        assert_eq!(settled.status, ContractStatus::TicketClosed);
    }

    #[tokio::test]
    async fn disabled_payouts_record_sentinel_ledger_entries_for_both_parties() {
        let s = setup(false, true);
        let contract = disputed_contract(&s.store).await;
        expired_ticket(&s.store, &contract).await;

        let outcomes = s.service.close_expired_tickets().await;
        assert_eq!(outcomes[0].status, SweepItemStatus::Success);
        for leg in &outcomes[0].legs {
            assert_eq!(leg.status, SweepItemStatus::Success);
            assert_eq!(leg.payout_id.as_deref(), Some(SKIPPED_PAYOUT_ID));
        }

        let entries = s.store.list_for_contract(contract.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .all(|e| e.payment_type == PaymentType::Sent
                && e.payout_id.as_deref() == Some(SKIPPED_PAYOUT_ID)));
    }

    #[tokio::test]
    async fn missing_credentials_fail_the_ticket_but_not_the_sweep() {
        let s = setup(true, false);
        let first = disputed_contract(&s.store).await;
        expired_ticket(&s.store, &first).await;
        let second = disputed_contract(&s.store).await;
        expired_ticket(&s.store, &second).await;

        let outcomes = s.service.close_expired_tickets().await;
        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(outcome.status, SweepItemStatus::Failed);
            assert!(outcome.reason.as_deref().unwrap_or_default().contains("credentials"));
        }
        // the tickets were still closed before the credential check
        for outcome in &outcomes {
            let ticket = TicketRepository::load(s.store.as_ref(), outcome.ticket_id)
                .await
                .unwrap();
            assert_eq!(ticket.status, TicketStatus::Closed);
        }
    }

    #[tokio::test]
    async fn fresh_tickets_wait_out_the_cooling_off_window() {
        let s = setup(false, true);
        let contract = disputed_contract(&s.store).await;
        TicketRepository::create(s.store.as_ref(), fixtures::open_ticket(&contract))
            .await
            .unwrap();

        let outcomes = s.service.close_expired_tickets().await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn failed_leg_still_settles_the_contract() {
        let s = setup(true, true);
        let contract = disputed_contract(&s.store).await;
        expired_ticket(&s.store, &contract).await;
        s.gateway.fail_payouts();

        let outcomes = s.service.close_expired_tickets().await;
        assert_eq!(outcomes[0].status, SweepItemStatus::Failed);
        assert!(outcomes[0]
            .legs
            .iter()
            .all(|l| l.status == SweepItemStatus::Failed));

        let settled = ContractRepository::load(s.store.as_ref(), contract.id).await.unwrap();
        assert_eq!(settled.form_status, FormStatus::Closed);
    }
}
