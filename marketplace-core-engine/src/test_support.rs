//! Shared test doubles and fixtures for the engine's unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use marketplace_core_api::service::Notifier;

use crate::gateway::{GatewayError, PayoutGateway, PayoutRecipient};

/// One payout accepted by the [`MockGateway`].
#[derive(Debug, Clone)]
pub struct PayoutCall {
    pub fund_account_id: String,
    pub amount_minor: i64,
    pub reference: String,
    pub idempotency_key: String,
}

/// Scripted payout gateway. Succeeds by default; individual references or
/// the whole payout step can be failed to exercise sweep isolation.
#[derive(Default)]
pub struct MockGateway {
    pub contacts: Mutex<Vec<String>>,
    pub payouts: Mutex<Vec<PayoutCall>>,
    fail_all_payouts: Mutex<bool>,
    fail_references: Mutex<HashSet<String>>,
    counter: AtomicU64,
}

impl MockGateway {
    pub fn fail_payouts(&self) {
        *self.fail_all_payouts.lock() = true;
    }

    /// Fail payouts whose reference equals the given contract id string.
    pub fn fail_reference(&self, reference: impl Into<String>) {
        self.fail_references.lock().insert(reference.into());
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl PayoutGateway for MockGateway {
    async fn ensure_contact(&self, recipient: &PayoutRecipient) -> Result<String, GatewayError> {
        let contact_id = format!("cont_{}", recipient.user_id.simple());
        self.contacts.lock().push(contact_id.clone());
        Ok(contact_id)
    }

    async fn ensure_fund_account(&self, contact_id: &str) -> Result<String, GatewayError> {
        Ok(format!("fa_{contact_id}"))
    }

    async fn create_payout(
        &self,
        fund_account_id: &str,
        amount_minor: i64,
        reference: &str,
        idempotency_key: &str,
    ) -> Result<String, GatewayError> {
        if *self.fail_all_payouts.lock() || self.fail_references.lock().contains(reference) {
            return Err(GatewayError::Rejected {
                status: 500,
                message: "scripted payout failure".to_string(),
            });
        }
        self.payouts.lock().push(PayoutCall {
            fund_account_id: fund_account_id.to_string(),
            amount_minor,
            reference: reference.to_string(),
            idempotency_key: idempotency_key.to_string(),
        });
        Ok(format!("pout_{:04}", self.next()))
    }
}

/// Records notifications; can be flipped to fail so best-effort handling is
/// observable.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<(Vec<Uuid>, String)>>,
    pub admin_notifications: Mutex<Vec<String>>,
    pub fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn fail_all(&self) {
        *self.fail.lock() = true;
    }

    fn check(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if *self.fail.lock() {
            return Err("scripted notifier failure".into());
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        recipients: &[Uuid],
        title: &str,
        _subject: &str,
        _url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check()?;
        self.notifications
            .lock()
            .push((recipients.to_vec(), title.to_string()));
        Ok(())
    }

    async fn notify_admins(
        &self,
        title: &str,
        _subject: &str,
        _url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check()?;
        self.admin_notifications.lock().push(title.to_string());
        Ok(())
    }

    async fn send_email(
        &self,
        _addresses: &[String],
        _subject: &str,
        _html_body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check()
    }
}

pub mod fixtures {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use marketplace_core_db::models::{
        ContractModel, ContractStatus, FormStatus, PartyModel, PaymentType, TicketModel,
        TicketStatus, TransactionModel,
    };
    use marketplace_core_db::utils::to_heapless;
    use marketplace_core_api::domain::TicketReason;

    /// A working contract with a 1000 budget and nothing paid or approved.
    pub fn contract() -> ContractModel {
        let now = Utc::now();
        ContractModel {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            bid_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            freelancer_id: Uuid::new_v4(),
            budget: Decimal::from(1000),
            paid_amount: Decimal::ZERO,
            paid_percentage: Decimal::ZERO,
            completion_percentage: Decimal::ZERO,
            temp_completion_percentage: Decimal::ZERO,
            remarks: None,
            status: ContractStatus::Working,
            form_status: FormStatus::Open,
            settlement_claimed_at: None,
            trashed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A contract at 100% approved completion, due for settlement.
    pub fn completed_contract() -> ContractModel {
        let mut contract = contract();
        contract.completion_percentage = Decimal::from(100);
        contract.paid_percentage = Decimal::from(100);
        contract.paid_amount = contract.budget;
        contract.status = ContractStatus::Completed;
        contract
    }

    pub fn party(id: Uuid) -> PartyModel {
        PartyModel {
            id,
            display_name: to_heapless::<100>("Test Person").expect("fixture name fits"),
            email: to_heapless::<100>("person@example.com").expect("fixture email fits"),
            phone: None,
        }
    }

    pub fn ledger_entry(
        contract_id: Uuid,
        amount: Decimal,
        payment_type: PaymentType,
    ) -> TransactionModel {
        TransactionModel {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            bid_id: Uuid::new_v4(),
            contract_id,
            amount,
            payment_person: Uuid::new_v4(),
            payment_type,
            payout_id: None,
            created_at: Utc::now(),
        }
    }

    /// An open dispute against the given contract, raised by its client.
    pub fn open_ticket(contract: &ContractModel) -> TicketModel {
        TicketModel {
            id: Uuid::new_v4(),
            project_id: contract.project_id,
            bid_id: contract.bid_id,
            contract_id: contract.id,
            client_id: contract.client_id,
            freelancer_id: contract.freelancer_id,
            freelancer_percent: None,
            client_percent: None,
            reason: TicketReason::IncompleteWork,
            remarks: None,
            raised_by: contract.client_id,
            status: TicketStatus::RefundPending,
            trashed: false,
            created_at: Utc::now(),
        }
    }
}
