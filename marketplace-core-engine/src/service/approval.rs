//! Milestone review: the client approves or rejects the submitted
//! completion percentage.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

use marketplace_core_api::domain::{Actor, ReviewDecision, ReviewMilestoneRequest};
use marketplace_core_api::service::Notifier;
use marketplace_core_api::{ApiError, ApiResult};
use marketplace_core_db::models::{
    ApprovalAction, ContractApprovalLogModel, ContractModel, ContractStatus,
};
use marketplace_core_db::repository::{
    ApprovalLogRepository, AttachmentRepository, ContractRepository,
};
use marketplace_core_db::utils::to_optional_heapless;

use crate::service::audit::new_log_entry;

pub struct ReviewOutcome {
    pub contract: ContractModel,
    pub log_entry: Option<ContractApprovalLogModel>,
}

pub struct ApprovalService {
    contracts: Arc<dyn ContractRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    approval_logs: Arc<dyn ApprovalLogRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        attachments: Arc<dyn AttachmentRepository>,
        approval_logs: Arc<dyn ApprovalLogRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            contracts,
            attachments,
            approval_logs,
            notifier,
        }
    }

    /// Review the milestone currently under submission.
    ///
    /// Approve promotes the claimed percentage to the approved completion;
    /// reject leaves the approved completion untouched and sends the
    /// contract to rework. Either way the reviewer's remarks land on the
    /// active attachments at the claimed percentage.
    pub async fn review(
        &self,
        request: ReviewMilestoneRequest,
        actor: Actor,
    ) -> ApiResult<ReviewOutcome> {
        request
            .validate()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;

        let contract = self
            .contracts
            .find_by_id(request.contract_id)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract {}", request.contract_id)))?;

        let reviewed_percentage = contract.temp_completion_percentage;
        let (completion, status, action) = match request.decision {
            ReviewDecision::Approve => {
                let new_completion = reviewed_percentage;
                let status = approved_status(new_completion, contract.paid_percentage);
                (new_completion, status, ApprovalAction::Approved)
            }
            ReviewDecision::Reject => (
                contract.completion_percentage,
                ContractStatus::ReworkNeeded,
                ApprovalAction::Rejected,
            ),
        };

        let remarks =
            to_optional_heapless::<500>(&request.remarks).map_err(ApiError::ValidationError)?;
        let contract = self
            .contracts
            .apply_review(contract.id, remarks.clone(), completion, status)
            .await
            .map_err(ApiError::database)?;

        // Reviewer remarks are applied at the claimed percentage for both
        // decisions.
        self.attachments
            .set_client_remarks(contract.id, reviewed_percentage, remarks.clone())
            .await
            .map_err(ApiError::database)?;

        let entry = new_log_entry(
            contract.id,
            reviewed_percentage,
            action,
            remarks,
            actor.id,
            actor.role,
            None,
        );
        let log_entry = match self.approval_logs.append(entry).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(contract_id = %contract.id, "approval log append failed: {e}");
                None
            }
        };

        if let Err(e) = self
            .notifier
            .notify(
                &[contract.freelancer_id],
                match request.decision {
                    ReviewDecision::Approve => "Milestone approved",
                    ReviewDecision::Reject => "Milestone rejected",
                },
                "Your milestone was reviewed",
                &format!("/contracts/{}", contract.id),
            )
            .await
        {
            warn!(contract_id = %contract.id, "review notification failed: {e}");
        }

        Ok(ReviewOutcome {
            contract,
            log_entry,
        })
    }
}

/// Status after an approval at `completion` with `paid` percent invoiced so
/// far. Full completion wins; otherwise catching up to the invoiced share
/// means more payment is owed before more work proceeds.
fn approved_status(completion: Decimal, paid: Decimal) -> ContractStatus {
    if completion == Decimal::from(100) {
        ContractStatus::Completed
    } else if completion >= paid {
        ContractStatus::PaymentPending
    } else {
        ContractStatus::Working
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::{fixtures, RecordingNotifier};
    use marketplace_core_api::domain::UserRole;
    use uuid::Uuid;

    fn service(store: &Arc<MemoryStore>, notifier: &Arc<RecordingNotifier>) -> ApprovalService {
        ApprovalService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifier.clone(),
        )
    }

    fn client_actor() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: UserRole::Client,
        }
    }

    fn review_request(contract_id: Uuid, decision: ReviewDecision) -> ReviewMilestoneRequest {
        ReviewMilestoneRequest {
            contract_id,
            decision,
            remarks: "looks good".to_string(),
        }
    }

    async fn submitted_contract(
        store: &Arc<MemoryStore>,
        temp: u32,
        paid: u32,
        completion: u32,
    ) -> ContractModel {
        let mut contract = fixtures::contract();
        contract.temp_completion_percentage = Decimal::from(temp);
        contract.paid_percentage = Decimal::from(paid);
        contract.completion_percentage = Decimal::from(completion);
        contract.status = ContractStatus::Submitted;
        ContractRepository::create(store.as_ref(), contract)
            .await
            .unwrap()
    }

    #[test]
    fn approved_status_branch_table() {
        // caught up with invoiced share -> payment owed
        assert_eq!(
            approved_status(Decimal::from(50), Decimal::from(50)),
            ContractStatus::PaymentPending
        );
        // fully complete wins even when fully paid
        assert_eq!(
            approved_status(Decimal::from(100), Decimal::from(100)),
            ContractStatus::Completed
        );
        // behind the invoiced share -> keep working
        assert_eq!(
            approved_status(Decimal::from(30), Decimal::from(100)),
            ContractStatus::Working
        );
    }

    #[tokio::test]
    async fn approval_promotes_temp_percentage() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let contract = submitted_contract(&store, 50, 50, 25).await;

        let outcome = service(&store, &notifier)
            .review(review_request(contract.id, ReviewDecision::Approve), client_actor())
            .await
            .unwrap();

        assert_eq!(outcome.contract.completion_percentage, Decimal::from(50));
        assert_eq!(outcome.contract.status, ContractStatus::PaymentPending);
        let entry = outcome.log_entry.expect("log entry written");
        assert_eq!(entry.action, ApprovalAction::Approved);
        assert_eq!(entry.percentage, Decimal::from(50));
    }

    #[tokio::test]
    async fn full_completion_approval_completes_the_contract() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let contract = submitted_contract(&store, 100, 100, 50).await;

        let outcome = service(&store, &notifier)
            .review(review_request(contract.id, ReviewDecision::Approve), client_actor())
            .await
            .unwrap();

        assert_eq!(outcome.contract.status, ContractStatus::Completed);
        assert_eq!(outcome.contract.completion_percentage, Decimal::from(100));
    }

    #[tokio::test]
    async fn rejection_preserves_completion_and_requires_rework() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let contract = submitted_contract(&store, 75, 100, 50).await;

        let outcome = service(&store, &notifier)
            .review(review_request(contract.id, ReviewDecision::Reject), client_actor())
            .await
            .unwrap();

        assert_eq!(outcome.contract.completion_percentage, Decimal::from(50));
        assert_eq!(outcome.contract.status, ContractStatus::ReworkNeeded);
        let entry = outcome.log_entry.expect("log entry written");
        assert_eq!(entry.action, ApprovalAction::Rejected);
        // the log still records the reviewed (claimed) percentage
        assert_eq!(entry.percentage, Decimal::from(75));
    }

    #[tokio::test]
    async fn remarks_land_on_attachments_at_claimed_percentage_for_both_decisions() {
        for decision in [ReviewDecision::Approve, ReviewDecision::Reject] {
            let store = Arc::new(MemoryStore::new());
            let notifier = Arc::new(RecordingNotifier::default());
            let contract = submitted_contract(&store, 60, 100, 40).await;

            let mut attachment = fixtures_attachment(&contract, 60);
            attachment.trashed = false;
            store.insert_many(vec![attachment]).await.unwrap();

            service(&store, &notifier)
                .review(review_request(contract.id, decision), client_actor())
                .await
                .unwrap();

            let active = store
                .find_active_by_milestone(contract.id, Decimal::from(60))
                .await
                .unwrap();
            assert_eq!(
                active[0].client_remarks.as_ref().map(|r| r.as_str()),
                Some("looks good"),
                "decision {decision:?}"
            );
        }
    }

    fn fixtures_attachment(
        contract: &ContractModel,
        percentage: u32,
    ) -> marketplace_core_db::models::ContractAttachmentModel {
        use marketplace_core_db::utils::to_heapless;
        marketplace_core_db::models::ContractAttachmentModel {
            id: Uuid::new_v4(),
            contract_id: contract.id,
            project_id: contract.project_id,
            bid_id: contract.bid_id,
            filename: to_heapless::<255>("work.zip").unwrap(),
            extension: to_heapless::<20>("zip").unwrap(),
            size_kib: Decimal::from(10),
            milestone_percentage: Decimal::from(percentage),
            storage_path: to_heapless::<500>("/uploads/work.zip").unwrap(),
            freelancer_remarks: None,
            client_remarks: None,
            trashed: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn unknown_contract_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());

        let result = service(&store, &notifier)
            .review(
                review_request(Uuid::new_v4(), ReviewDecision::Approve),
                client_actor(),
            )
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
