//! Milestone submission: a freelancer claims a completion percentage and
//! uploads the deliverables backing it.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use marketplace_core_api::domain::{SubmitMilestoneRequest, UploadedFile, UserRole};
use marketplace_core_api::service::Notifier;
use marketplace_core_api::{ApiError, ApiResult};
use marketplace_core_db::models::{
    ApprovalAction, ContractApprovalLogModel, ContractAttachmentModel, ContractModel,
};
use marketplace_core_db::repository::{
    ApprovalLogRepository, AttachmentRepository, ContractRepository,
};
use marketplace_core_db::utils::{to_heapless, to_optional_heapless};

use crate::service::audit::new_log_entry;

pub struct MilestoneSubmission {
    pub contract: ContractModel,
    /// Active deliverables at the submitted milestone after the resubmission
    /// supersede pass.
    pub attachment_count: u64,
    pub log_entry: Option<ContractApprovalLogModel>,
}

pub struct MilestoneService {
    contracts: Arc<dyn ContractRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    approval_logs: Arc<dyn ApprovalLogRepository>,
    notifier: Arc<dyn Notifier>,
}

impl MilestoneService {
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

    /// Submit deliverables for one milestone percentage.
    ///
    /// The caller's authorization happened upstream; the transition is
    /// applied unconditionally against the referenced contract, with the
    /// contract's freelancer recorded as the acting user.
    pub async fn submit_milestone(
        &self,
        request: SubmitMilestoneRequest,
    ) -> ApiResult<MilestoneSubmission> {
        request
            .validate()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;

        let contract = self
            .contracts
            .find_by_id(request.contract_id)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::NotFound(format!("Contract {}", request.contract_id)))?;

        let remarks =
            to_optional_heapless::<500>(&request.remarks).map_err(ApiError::ValidationError)?;
        let contract = self
            .contracts
            .record_submission(contract.id, remarks.clone(), request.percentage)
            .await
            .map_err(ApiError::database)?;

        self.attachments
            .trash_superseded(contract.id, request.percentage, &request.kept_attachment_ids)
            .await
            .map_err(ApiError::database)?;
        self.attachments
            .update_freelancer_remarks(
                contract.id,
                request.percentage,
                &request.kept_attachment_ids,
                remarks.clone(),
            )
            .await
            .map_err(ApiError::database)?;

        let uploads = request
            .files
            .iter()
            .map(|file| new_attachment(&contract, request.percentage, file, remarks.clone()))
            .collect::<ApiResult<Vec<_>>>()?;
        let uploaded = uploads.len() as u64;
        self.attachments
            .insert_many(uploads)
            .await
            .map_err(ApiError::database)?;

        // Best-effort: a counting failure falls back to the upload count.
        let attachment_count = match self
            .attachments
            .count_active(contract.id, request.percentage)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!(contract_id = %contract.id, "attachment count failed, using upload count: {e}");
                uploaded
            }
        };

        let entry = new_log_entry(
            contract.id,
            request.percentage,
            ApprovalAction::AttachmentSubmitted,
            remarks,
            contract.freelancer_id,
            UserRole::Freelancer,
            Some(attachment_count as u32),
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
                &[contract.client_id],
                "Milestone submitted",
                "A milestone was submitted for your review",
                &format!("/contracts/{}", contract.id),
            )
            .await
        {
            warn!(contract_id = %contract.id, "milestone notification failed: {e}");
        }

        Ok(MilestoneSubmission {
            contract,
            attachment_count,
            log_entry,
        })
    }
}

fn new_attachment(
    contract: &ContractModel,
    percentage: Decimal,
    file: &UploadedFile,
    remarks: Option<heapless::String<500>>,
) -> ApiResult<ContractAttachmentModel> {
    Ok(ContractAttachmentModel {
        id: Uuid::new_v4(),
        contract_id: contract.id,
        project_id: contract.project_id,
        bid_id: contract.bid_id,
        filename: to_heapless::<255>(&file.filename).map_err(ApiError::ValidationError)?,
        extension: to_heapless::<20>(extension_of(&file.filename))
            .map_err(ApiError::ValidationError)?,
        size_kib: size_in_kib(file.size_bytes),
        milestone_percentage: percentage,
        storage_path: to_heapless::<500>(&file.storage_path).map_err(ApiError::ValidationError)?,
        freelancer_remarks: remarks,
        client_remarks: None,
        trashed: false,
        created_at: Utc::now(),
    })
}

/// The part after the final dot, or empty when the filename has none.
fn extension_of(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

/// File size in KiB, rounded to 2 decimals.
fn size_in_kib(size_bytes: u64) -> Decimal {
    (Decimal::from(size_bytes) / Decimal::from(1024)).round_dp(2)
}
