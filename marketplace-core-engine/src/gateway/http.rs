//! HTTPS JSON client for the payout gateway.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{GatewayCredentials, SettlementConfig};
use crate::gateway::{GatewayError, PayoutGateway, PayoutRecipient};

const IDEMPOTENCY_HEADER: &str = "X-Payout-Idempotency-Key";

pub struct HttpPayoutGateway {
    client: Client,
    credentials: GatewayCredentials,
    base_url: String,
    account_number: String,
    sink_vpa: String,
    currency: String,
    contact_timeout: Duration,
    payout_timeout: Duration,
}

#[derive(Serialize)]
struct ContactRequest<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
    reference_id: String,
}

#[derive(Serialize)]
struct FundAccountRequest<'a> {
    contact_id: &'a str,
    account_type: &'static str,
    vpa: VpaDetails<'a>,
}

#[derive(Serialize)]
struct VpaDetails<'a> {
    address: &'a str,
}

#[derive(Serialize)]
struct PayoutRequest<'a> {
    account_number: &'a str,
    fund_account_id: &'a str,
    amount: i64,
    currency: &'a str,
    mode: &'static str,
    purpose: &'static str,
    reference_id: &'a str,
    queue_if_low_balance: bool,
}

impl HttpPayoutGateway {
    pub fn new(config: &SettlementConfig, credentials: GatewayCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_number: config.account_number.clone(),
            sink_vpa: config.sink_vpa.clone(),
            currency: config.currency.clone(),
            contact_timeout: Duration::from_secs(config.contact_timeout_secs),
            payout_timeout: Duration::from_secs(config.payout_timeout_secs),
        }
    }

    async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
        timeout: Duration,
        idempotency_key: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .timeout(timeout)
            .json(body);
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(e.to_string())
            }
        })
    }

    async fn resolve_created_id(&self, response: Response) -> Result<String, GatewayError> {
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        resolve_create_or_reuse(status, &body)
    }
}

/// Resolves a create-or-reuse response: 2xx yields the new resource id, 409
/// yields the existing id carried in the conflict's error metadata, anything
/// else is a rejection.
fn resolve_create_or_reuse(status: StatusCode, body: &Value) -> Result<String, GatewayError> {
    if status.is_success() {
        return id_from_body(body)
            .ok_or_else(|| GatewayError::InvalidResponse(format!("no id in response: {body}")));
    }
    if status == StatusCode::CONFLICT {
        if let Some(existing) = existing_id_from_conflict(body) {
            debug!(%existing, "gateway resource already exists, reusing");
            return Ok(existing);
        }
        warn!("conflict response carried no resource id: {body}");
    }
    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message: error_description(body),
    })
}

/// Extracts the `id` field of a created resource.
fn id_from_body(body: &Value) -> Option<String> {
    body.get("id").and_then(Value::as_str).map(str::to_string)
}

/// Pulls the existing resource id out of a conflict response's error
/// metadata.
fn existing_id_from_conflict(body: &Value) -> Option<String> {
    let metadata = body.get("error")?.get("metadata")?;
    for key in ["contact_id", "fund_account_id", "payout_id", "id"] {
        if let Some(id) = metadata.get(key).and_then(Value::as_str) {
            return Some(id.to_string());
        }
    }
    None
}

fn error_description(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
        .unwrap_or("no error description")
        .to_string()
}

#[async_trait]
impl PayoutGateway for HttpPayoutGateway {
    async fn ensure_contact(&self, recipient: &PayoutRecipient) -> Result<String, GatewayError> {
        let body = ContactRequest {
            name: &recipient.name,
            email: &recipient.email,
            contact: recipient.phone.as_deref(),
            kind: "vendor",
            reference_id: recipient.user_id.to_string(),
        };
        let response = self
            .post("/contacts", &body, self.contact_timeout, None)
            .await?;
        self.resolve_created_id(response).await
    }

    async fn ensure_fund_account(&self, contact_id: &str) -> Result<String, GatewayError> {
        let body = FundAccountRequest {
            contact_id,
            account_type: "vpa",
            vpa: VpaDetails {
                address: &self.sink_vpa,
            },
        };
        let response = self
            .post("/fund_accounts", &body, self.contact_timeout, None)
            .await?;
        self.resolve_created_id(response).await
    }

    async fn create_payout(
        &self,
        fund_account_id: &str,
        amount_minor: i64,
        reference: &str,
        idempotency_key: &str,
    ) -> Result<String, GatewayError> {
        let body = PayoutRequest {
            account_number: &self.account_number,
            fund_account_id,
            amount: amount_minor,
            currency: &self.currency,
            mode: "UPI",
            purpose: "payout",
            reference_id: reference,
            queue_if_low_balance: true,
        };
        let response = self
            .post("/payouts", &body, self.payout_timeout, Some(idempotency_key))
            .await?;
        let status = response.status();
        let value: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: error_description(&value),
            });
        }
        id_from_body(&value)
            .ok_or_else(|| GatewayError::InvalidResponse(format!("no payout id in response: {value}")))
    }
}
