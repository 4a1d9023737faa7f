use serde::{Deserialize, Serialize};

/// Static credential pair for the payout gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: String,
}

/// Settlement configuration, injected into the sweeps explicitly so both
/// the enabled and disabled payout paths can be exercised deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Gateway credentials; `None` means the gateway is not configured.
    pub credentials: Option<GatewayCredentials>,
    /// Operational kill switch: when false, payouts are recorded in the
    /// ledger with a sentinel payout id instead of calling the gateway.
    pub payouts_enabled: bool,
    /// Payout gateway base URL.
    pub base_url: String,
    /// Settlement account debited by payouts.
    pub account_number: String,
    /// Fixed virtual-payment-address sink fund accounts are created
    /// against in this deployment.
    pub sink_vpa: String,
    /// Currency code sent with payouts (amounts travel in minor units).
    pub currency: String,
    /// Timeout for contact / fund-account creation calls, in seconds.
    pub contact_timeout_secs: u64,
    /// Timeout for payout creation calls, in seconds.
    pub payout_timeout_secs: u64,
    /// Cadence of the payout settlement sweep, in seconds.
    pub settlement_interval_secs: u64,
    /// Cadence of the ticket close sweep, in seconds.
    pub ticket_interval_secs: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            payouts_enabled: false,
            base_url: "https://api.payout-gateway.example".to_string(),
            account_number: String::new(),
            sink_vpa: "settlement@bank".to_string(),
            currency: "INR".to_string(),
            contact_timeout_secs: 20,
            payout_timeout_secs: 15,
            settlement_interval_secs: 60,
            ticket_interval_secs: 86_400,
        }
    }
}

impl SettlementConfig {
    /// The configured credentials, or the configuration error every sweep
    /// reports when they are missing.
    pub fn require_credentials(&self) -> Result<&GatewayCredentials, &'static str> {
        self.credentials
            .as_ref()
            .ok_or("payout gateway credentials not configured")
    }
}
