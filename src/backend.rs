//! REST client for the marketplace backend, plus the wire records it returns.
//!
//! The backend speaks camelCase JSON; field renames below pin the contract.
//! [`BackendApi`] is the seam the readiness evaluator and schedule feed are
//! written against, so tests can swap in a mock backend.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorProfile {
    /// Persisted onboarding completion milestone.
    #[serde(rename = "onboardingCompleted", default)]
    pub onboarding_completed: bool,
    #[serde(rename = "onboardingSkipped", default)]
    pub onboarding_skipped: bool,
    #[serde(rename = "welcomeSeen", default)]
    pub welcome_seen: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(rename = "licenseUrl", default)]
    pub license_url: Option<String>,
    #[serde(rename = "licenseStatus", default)]
    pub license_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentAccountStatus {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "chargesEnabled", default)]
    pub charges_enabled: bool,
    #[serde(rename = "payoutsEnabled", default)]
    pub payouts_enabled: bool,
}

impl PaymentAccountStatus {
    /// Payouts count as set up only once Stripe enables both directions.
    pub fn is_complete(&self) -> bool {
        self.charges_enabled && self.payouts_enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    #[serde(default)]
    pub day: String,
    #[serde(rename = "isAvailable", default)]
    pub is_available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementsRecord {
    #[serde(default)]
    pub id: Option<i64>,
}

impl RequirementsRecord {
    /// The backend hands back an empty shell until the operator saves the
    /// form; a persisted row carries a positive id.
    pub fn is_configured(&self) -> bool {
        self.id.is_some_and(|id| id > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: i64,
    #[serde(rename = "kitchenId")]
    pub kitchen_id: i64,
    /// Civil date YYYY-MM-DD in the booking's own zone.
    pub date: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "endTime")]
    pub end_time: String,
    /// IANA zone the civil fields are read in.
    pub timezone: String,
    #[serde(default)]
    pub status: String,
}

impl BookingRecord {
    pub fn is_cancelled(&self) -> bool {
        self.status.eq_ignore_ascii_case("cancelled")
    }
}

/// Everything the feed needs from the backend, one method per endpoint.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn fetch_profile(&self) -> Result<OperatorProfile>;
    async fn fetch_location(&self, location_id: &str) -> Result<LocationRecord>;
    async fn fetch_payment_status(&self, location_id: &str) -> Result<PaymentAccountStatus>;
    async fn fetch_kitchens(&self, location_id: &str) -> Result<Vec<KitchenRecord>>;
    async fn fetch_availability(&self, kitchen_id: i64) -> Result<Vec<DayAvailability>>;
    async fn fetch_requirements(&self, location_id: &str) -> Result<RequirementsRecord>;
    async fn fetch_bookings(&self, location_id: &str) -> Result<Vec<BookingRecord>>;
}

/// Authenticated reqwest wrapper. The bearer token is attached once as a
/// default header at construction; call sites never touch auth.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = cfg.api_token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            warn!("KITCHEN_API_TOKEN not set; calling the backend unauthenticated");
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(cfg.http_timeout_ms))
            .build()?;

        Ok(Self {
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn fetch_profile(&self) -> Result<OperatorProfile> {
        self.get_json("/profile").await
    }

    async fn fetch_location(&self, location_id: &str) -> Result<LocationRecord> {
        self.get_json(&format!("/locations/{location_id}")).await
    }

    async fn fetch_payment_status(&self, location_id: &str) -> Result<PaymentAccountStatus> {
        self.get_json(&format!("/locations/{location_id}/stripe-status"))
            .await
    }

    async fn fetch_kitchens(&self, location_id: &str) -> Result<Vec<KitchenRecord>> {
        self.get_json(&format!("/locations/{location_id}/kitchens"))
            .await
    }

    async fn fetch_availability(&self, kitchen_id: i64) -> Result<Vec<DayAvailability>> {
        self.get_json(&format!("/kitchens/{kitchen_id}/availability"))
            .await
    }

    async fn fetch_requirements(&self, location_id: &str) -> Result<RequirementsRecord> {
        self.get_json(&format!("/locations/{location_id}/requirements"))
            .await
    }

    async fn fetch_bookings(&self, location_id: &str) -> Result<Vec<BookingRecord>> {
        self.get_json(&format!("/locations/{location_id}/bookings"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_with_base(base: &str) -> Config {
        Config {
            api_base_url: base.to_string(),
            api_token: Some("test-token".to_string()),
            location_id: "loc-1".to_string(),
            tz: "America/New_York".to_string(),
            watch: false,
            refresh_secs: 300,
            http_timeout_ms: 5_000,
        }
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = BackendClient::new(&cfg_with_base("http://localhost:4000/api/")).unwrap();
        assert_eq!(client.base_url, "http://localhost:4000/api");
    }

    #[test]
    fn client_builds_without_a_token() {
        let mut cfg = cfg_with_base("http://localhost:4000/api");
        cfg.api_token = None;
        assert!(BackendClient::new(&cfg).is_ok());
    }

    #[test]
    fn profile_decodes_camel_case_flags() {
        let raw = r#"{"onboardingCompleted":true,"onboardingSkipped":false,"welcomeSeen":true}"#;
        let profile: OperatorProfile = serde_json::from_str(raw).unwrap();
        assert!(profile.onboarding_completed);
        assert!(!profile.onboarding_skipped);
        assert!(profile.welcome_seen);
    }

    #[test]
    fn missing_profile_flags_default_to_false() {
        let profile: OperatorProfile = serde_json::from_str("{}").unwrap();
        assert!(!profile.onboarding_completed);
    }

    #[test]
    fn location_license_fields_are_optional() {
        let loc: LocationRecord =
            serde_json::from_str(r#"{"licenseUrl":"https://cdn/x.pdf","licenseStatus":"approved"}"#)
                .unwrap();
        assert_eq!(loc.license_url.as_deref(), Some("https://cdn/x.pdf"));
        assert_eq!(loc.license_status.as_deref(), Some("approved"));

        let bare: LocationRecord = serde_json::from_str("{}").unwrap();
        assert!(bare.license_url.is_none());
        assert!(bare.license_status.is_none());
    }

    #[test]
    fn payment_completion_needs_both_directions() {
        let both: PaymentAccountStatus =
            serde_json::from_str(r#"{"status":"active","chargesEnabled":true,"payoutsEnabled":true}"#)
                .unwrap();
        assert!(both.is_complete());

        let one: PaymentAccountStatus =
            serde_json::from_str(r#"{"status":"pending","chargesEnabled":true,"payoutsEnabled":false}"#)
                .unwrap();
        assert!(!one.is_complete());
    }

    #[test]
    fn requirements_need_a_persisted_row() {
        let saved: RequirementsRecord = serde_json::from_str(r#"{"id":12}"#).unwrap();
        assert!(saved.is_configured());

        let shell: RequirementsRecord = serde_json::from_str("{}").unwrap();
        assert!(!shell.is_configured());

        let zero: RequirementsRecord = serde_json::from_str(r#"{"id":0}"#).unwrap();
        assert!(!zero.is_configured());
    }

    #[test]
    fn booking_decodes_camel_case_schedule_fields() {
        let raw = r#"{
            "id": 44,
            "kitchenId": 7,
            "date": "2024-07-15",
            "startTime": "14:00",
            "endTime": "16:00",
            "timezone": "America/St_Johns",
            "status": "confirmed"
        }"#;
        let booking: BookingRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(booking.kitchen_id, 7);
        assert_eq!(booking.start_time, "14:00");
        assert!(!booking.is_cancelled());

        let cancelled: BookingRecord = serde_json::from_str(
            r#"{"id":1,"kitchenId":1,"date":"2024-07-15","startTime":"10:00","endTime":"11:00","timezone":"UTC","status":"CANCELLED"}"#,
        )
        .unwrap();
        assert!(cancelled.is_cancelled());
    }
}
