//! In-memory document store.
//!
//! Backs the engine in tests and single-process deployments. Every mutation
//! happens under one write lock per collection, which gives the same
//! single-document atomicity the real store provides; the settlement claim
//! check-and-set is atomic for the same reason.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use marketplace_core_db::models::{
    ContractApprovalLogModel, ContractAttachmentModel, ContractModel, ContractStatus, FormStatus,
    PartyModel, PaymentType, TicketModel, TicketStatus, TransactionModel,
};
use marketplace_core_db::repository::{
    ApprovalLogRepository, AttachmentRepository, ContractRepository, PartyRepository,
    TicketRepository, TransactionRepository,
};

type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Default)]
pub struct MemoryStore {
    contracts: RwLock<HashMap<Uuid, ContractModel>>,
    tickets: RwLock<HashMap<Uuid, TicketModel>>,
    attachments: RwLock<HashMap<Uuid, ContractAttachmentModel>>,
    approval_logs: RwLock<Vec<ContractApprovalLogModel>>,
    transactions: RwLock<Vec<TransactionModel>>,
    parties: RwLock<HashMap<Uuid, PartyModel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a directory entry (bid acceptance and user signup are outside
    /// this core).
    pub fn insert_party(&self, party: PartyModel) {
        self.parties.write().insert(party.id, party);
    }

    fn with_contract<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ContractModel) -> T,
    ) -> Result<T, StoreError> {
        let mut contracts = self.contracts.write();
        let contract = contracts
            .get_mut(&id)
            .ok_or_else(|| format!("Contract not found: {id}"))?;
        let result = f(contract);
        contract.updated_at = Utc::now();
        Ok(result)
    }
}

#[async_trait]
impl ContractRepository for MemoryStore {
    async fn load(&self, id: Uuid) -> Result<ContractModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| format!("Contract not found: {id}").into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContractModel>, StoreError> {
        Ok(self.contracts.read().get(&id).cloned())
    }

    async fn create(&self, contract: ContractModel) -> Result<ContractModel, StoreError> {
        self.contracts.write().insert(contract.id, contract.clone());
        Ok(contract)
    }

    async fn record_submission(
        &self,
        id: Uuid,
        remarks: Option<HeaplessString<500>>,
        percentage: Decimal,
    ) -> Result<ContractModel, StoreError> {
        self.with_contract(id, |contract| {
            contract.status = ContractStatus::Submitted;
            contract.remarks = remarks;
            contract.temp_completion_percentage = percentage;
            contract.clone()
        })
    }

    async fn apply_review(
        &self,
        id: Uuid,
        remarks: Option<HeaplessString<500>>,
        completion_percentage: Decimal,
        status: ContractStatus,
    ) -> Result<ContractModel, StoreError> {
        self.with_contract(id, |contract| {
            contract.remarks = remarks;
            contract.completion_percentage = completion_percentage;
            contract.status = status;
            contract.clone()
        })
    }

    async fn record_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        percentage: Decimal,
    ) -> Result<ContractModel, StoreError> {
        self.with_contract(id, |contract| {
            contract.paid_amount += amount;
            contract.paid_percentage += percentage;
            contract.clone()
        })
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ContractStatus,
    ) -> Result<ContractModel, StoreError> {
        self.with_contract(id, |contract| {
            contract.status = status;
            contract.clone()
        })
    }

    async fn find_due_for_settlement(&self) -> Result<Vec<ContractModel>, StoreError> {
        Ok(self
            .contracts
            .read()
            .values()
            .filter(|c| c.is_due_for_settlement())
            .cloned()
            .collect())
    }

    async fn try_claim_settlement(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.with_contract(id, |contract| {
            if contract.form_status == FormStatus::Closed || contract.settlement_claimed_at.is_some()
            {
                return false;
            }
            contract.settlement_claimed_at = Some(now);
            true
        })
    }

    async fn release_settlement_claim(&self, id: Uuid) -> Result<(), StoreError> {
        self.with_contract(id, |contract| {
            contract.settlement_claimed_at = None;
        })
    }

    async fn settle(
        &self,
        id: Uuid,
        status: Option<ContractStatus>,
    ) -> Result<ContractModel, StoreError> {
        self.with_contract(id, |contract| {
            contract.form_status = FormStatus::Closed;
            contract.settlement_claimed_at = None;
            if let Some(status) = status {
                contract.status = status;
            }
            contract.clone()
        })
    }
}

#[async_trait]
impl AttachmentRepository for MemoryStore {
    async fn insert_many(
        &self,
        attachments: Vec<ContractAttachmentModel>,
    ) -> Result<Vec<ContractAttachmentModel>, StoreError> {
        let mut store = self.attachments.write();
        for attachment in &attachments {
            store.insert(attachment.id, attachment.clone());
        }
        Ok(attachments)
    }

    async fn find_active_by_milestone(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
    ) -> Result<Vec<ContractAttachmentModel>, StoreError> {
        let mut active: Vec<_> = self
            .attachments
            .read()
            .values()
            .filter(|a| {
                !a.trashed && a.contract_id == contract_id && a.milestone_percentage == percentage
            })
            .cloned()
            .collect();
        active.sort_by_key(|a| a.created_at);
        Ok(active)
    }

    async fn trash_superseded(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
        kept_ids: &[Uuid],
    ) -> Result<u64, StoreError> {
        let mut trashed = 0;
        for attachment in self.attachments.write().values_mut() {
            if !attachment.trashed
                && attachment.contract_id == contract_id
                && attachment.milestone_percentage == percentage
                && !kept_ids.contains(&attachment.id)
            {
                attachment.trashed = true;
                trashed += 1;
            }
        }
        Ok(trashed)
    }

    async fn update_freelancer_remarks(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
        kept_ids: &[Uuid],
        remarks: Option<HeaplessString<500>>,
    ) -> Result<u64, StoreError> {
        let mut updated = 0;
        for attachment in self.attachments.write().values_mut() {
            if !attachment.trashed
                && attachment.contract_id == contract_id
                && attachment.milestone_percentage == percentage
                && kept_ids.contains(&attachment.id)
            {
                attachment.freelancer_remarks = remarks.clone();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn set_client_remarks(
        &self,
        contract_id: Uuid,
        percentage: Decimal,
        remarks: Option<HeaplessString<500>>,
    ) -> Result<u64, StoreError> {
        let mut updated = 0;
        for attachment in self.attachments.write().values_mut() {
            if !attachment.trashed
                && attachment.contract_id == contract_id
                && attachment.milestone_percentage == percentage
            {
                attachment.client_remarks = remarks.clone();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn count_active(&self, contract_id: Uuid, percentage: Decimal) -> Result<u64, StoreError> {
        Ok(self
            .attachments
            .read()
            .values()
            .filter(|a| {
                !a.trashed && a.contract_id == contract_id && a.milestone_percentage == percentage
            })
            .count() as u64)
    }
}

#[async_trait]
impl ApprovalLogRepository for MemoryStore {
    async fn append(
        &self,
        entry: ContractApprovalLogModel,
    ) -> Result<ContractApprovalLogModel, StoreError> {
        self.approval_logs.write().push(entry.clone());
        Ok(entry)
    }

    async fn trail_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<ContractApprovalLogModel>, StoreError> {
        let mut entries: Vec<_> = self
            .approval_logs
            .read()
            .iter()
            .filter(|e| e.contract_id == contract_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create(&self, ticket: TicketModel) -> Result<TicketModel, StoreError> {
        self.tickets.write().insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn load(&self, id: Uuid) -> Result<TicketModel, StoreError> {
        self.tickets
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| format!("Ticket not found: {id}").into())
    }

    async fn find_open_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Option<TicketModel>, StoreError> {
        Ok(self
            .tickets
            .read()
            .values()
            .find(|t| {
                !t.trashed && t.contract_id == contract_id && t.status == TicketStatus::RefundPending
            })
            .cloned())
    }

    async fn find_expired_open(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<TicketModel>, StoreError> {
        let mut expired: Vec<_> = self
            .tickets
            .read()
            .values()
            .filter(|t| {
                !t.trashed && t.status == TicketStatus::RefundPending && t.created_at < cutoff
            })
            .cloned()
            .collect();
        expired.sort_by_key(|t| t.created_at);
        Ok(expired)
    }

    async fn close_with_split(
        &self,
        id: Uuid,
        freelancer_percent: Decimal,
        client_percent: Decimal,
    ) -> Result<TicketModel, StoreError> {
        let mut tickets = self.tickets.write();
        let ticket = tickets
            .get_mut(&id)
            .ok_or_else(|| format!("Ticket not found: {id}"))?;
        ticket.status = TicketStatus::Closed;
        ticket.freelancer_percent = Some(freelancer_percent);
        ticket.client_percent = Some(client_percent);
        Ok(ticket.clone())
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn record(&self, entry: TransactionModel) -> Result<TransactionModel, StoreError> {
        self.transactions.write().push(entry.clone());
        Ok(entry)
    }

    async fn list_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<TransactionModel>, StoreError> {
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|t| t.contract_id == contract_id)
            .cloned()
            .collect())
    }

    async fn paid_total(&self, contract_id: Uuid) -> Result<Decimal, StoreError> {
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|t| t.contract_id == contract_id && t.payment_type == PaymentType::Received)
            .map(|t| t.amount)
            .sum())
    }

    async fn payout_total(&self, contract_id: Uuid) -> Result<Decimal, StoreError> {
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|t| t.contract_id == contract_id && t.payment_type == PaymentType::Sent)
            .map(|t| t.amount)
            .sum())
    }
}

#[async_trait]
impl PartyRepository for MemoryStore {
    async fn find_party(&self, id: Uuid) -> Result<Option<PartyModel>, StoreError> {
        Ok(self.parties.read().get(&id).cloned())
    }
}
