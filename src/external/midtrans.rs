use crate::config::MidtransConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::time::Duration;

/// Midtrans Snap client. The server key never leaves this process; the
/// token it returns is the only thing handed to the browser widget.
#[derive(Clone)]
pub struct MidtransService {
    http: Client,
    cfg: MidtransConfig,
}

#[derive(Debug, Serialize)]
pub struct SnapTransactionRequest {
    pub transaction_details: TransactionDetails,
    pub item_details: Vec<ItemDetail>,
    pub customer_details: CustomerDetails,
}

#[derive(Debug, Serialize)]
pub struct TransactionDetails {
    /// Our human-facing order number, the cross-system key.
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetails {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnapTransactionResponse {
    pub token: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl MidtransService {
    pub fn new(cfg: MidtransConfig) -> Self {
        let http = Client::builder()
            .user_agent("kopi-backend/midtrans")
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .expect("reqwest client");
        Self { http, cfg }
    }

    pub fn is_configured(&self) -> bool {
        !self.cfg.server_key.is_empty()
    }

    /// Request a hosted-checkout (Snap) token for one order.
    pub async fn create_snap_transaction(
        &self,
        req: &SnapTransactionRequest,
    ) -> AppResult<SnapTransactionResponse> {
        if !self.is_configured() {
            return Err(AppError::ConfigError(
                "MIDTRANS_SERVER_KEY is not set".to_string(),
            ));
        }

        let url = format!(
            "{}/snap/v1/transactions",
            self.cfg.base_url.trim_end_matches('/')
        );

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.cfg.server_key, Some(""))
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .unwrap_or_else(|_| serde_json::Value::Null);

        if !status.is_success() {
            return Err(AppError::GatewayError {
                message: format!("Midtrans Snap error: HTTP {}", status.as_u16()),
                payload: body,
            });
        }

        let parsed: SnapTransactionResponse =
            serde_json::from_value(body.clone()).map_err(|_| AppError::GatewayError {
                message: "Invalid Midtrans response".to_string(),
                payload: body,
            })?;

        Ok(parsed)
    }

    /// Notification signature as Midtrans defines it:
    /// SHA512(order_id + status_code + gross_amount + server_key), hex.
    pub fn verify_notification_signature(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature_key: &str,
    ) -> bool {
        let expected = signature_hash(order_id, status_code, gross_amount, &self.cfg.server_key);
        expected == signature_key
    }
}

pub fn signature_hash(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(key: &str) -> MidtransService {
        MidtransService::new(MidtransConfig {
            server_key: key.to_string(),
            base_url: "https://app.sandbox.midtrans.com".to_string(),
            request_timeout_secs: 10,
        })
    }

    #[test]
    fn test_signature_accepts_exact_concatenation() {
        let svc = service("secret-key");
        let sig = signature_hash("CSH-20250825-ABC123", "200", "50000.00", "secret-key");
        assert!(svc.verify_notification_signature(
            "CSH-20250825-ABC123",
            "200",
            "50000.00",
            &sig
        ));
    }

    #[test]
    fn test_signature_rejects_any_altered_field() {
        let svc = service("secret-key");
        let sig = signature_hash("CSH-20250825-ABC123", "200", "50000.00", "secret-key");

        assert!(!svc.verify_notification_signature("CSH-20250825-ABC124", "200", "50000.00", &sig));
        assert!(!svc.verify_notification_signature("CSH-20250825-ABC123", "201", "50000.00", &sig));
        assert!(!svc.verify_notification_signature("CSH-20250825-ABC123", "200", "50001.00", &sig));
    }

    #[test]
    fn test_signature_rejects_wrong_server_key() {
        let svc = service("other-key");
        let sig = signature_hash("CSH-20250825-ABC123", "200", "50000.00", "secret-key");
        assert!(!svc.verify_notification_signature("CSH-20250825-ABC123", "200", "50000.00", &sig));
    }
}
