//! Persisted document models
//!
//! Field names are camelCase on the wire because the documents are shared
//! with the JavaScript admin front-end that created most of them.

use chrono::{DateTime, NaiveDate, Utc};
use leadflow_common::types::{
    AnalyticsEntryId, Attribution, DeviceClass, IntegrationId, LeadId, LeadSource, LeadStatus,
    OfferId, ProfileId, RoutingRule,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A captured visitor contact record.
///
/// Created once at capture and never updated afterwards, except `status`
/// which only the fan-out dispatcher mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    /// Original casing is preserved; uniqueness is enforced on the
    /// trimmed, lowercased form.
    pub email: String,
    pub source: LeadSource,
    pub timestamp: DateTime<Utc>,
    pub device: DeviceClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gclid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbclid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_data: Option<HashMap<String, String>>,
    pub status: LeadStatus,
}

impl Lead {
    /// Construct a new lead at the current instant with `Captured` status
    pub fn new(
        email: impl Into<String>,
        source: LeadSource,
        attribution: Attribution,
        quiz_data: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            source,
            timestamp: Utc::now(),
            device: attribution.device,
            utm_source: attribution.utm_source,
            utm_medium: attribution.utm_medium,
            utm_campaign: attribution.utm_campaign,
            utm_content: attribution.utm_content,
            gclid: attribution.gclid,
            fbclid: attribution.fbclid,
            quiz_data,
            status: LeadStatus::Captured,
        }
    }

    /// The form used for the uniqueness check
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Normalize an email for dedup comparison: trim, then lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A routable commercial destination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    /// May contain a literal `{subid}` placeholder
    pub url: String,
    /// Relative selection mass; zero means never selected while any
    /// positive weight exists
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub popularity: i64,
    /// Display string such as "$42.50"; also used as a sortable signal
    #[serde(default)]
    pub payout: String,
}

impl Offer {
    /// Numeric value of `payout` with non-numeric characters stripped,
    /// for ranking. Unparsable payouts sort as zero.
    pub fn payout_value(&self) -> f64 {
        let digits: String = self
            .payout
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        digits.parse().unwrap_or(0.0)
    }
}

/// Process-wide routing decision policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Fallback destination when no offer is selectable
    #[serde(default = "default_url")]
    pub default_url: String,
    #[serde(default)]
    pub rule: RoutingRule,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_url: default_url(),
            rule: RoutingRule::default(),
        }
    }
}

fn default_url() -> String {
    "/".to_string()
}

/// One outbound-mail sending identity under a daily quota
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpProfile {
    pub id: ProfileId,
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Opaque to the pipeline; only the admin front-end reads these
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub daily_limit: u32,
    #[serde(default)]
    pub current_usage: u32,
    #[serde(default)]
    pub is_active: bool,
    /// Calendar date of the last quota reset
    pub last_reset_date: NaiveDate,
}

impl SmtpProfile {
    /// Whether this profile can send one more message today
    pub fn has_quota(&self) -> bool {
        self.is_active && self.current_usage < self.daily_limit
    }
}

/// One webhook subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: IntegrationId,
    /// Display tag only; carries no behavioral difference
    pub provider: String,
    pub webhook_url: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default = "default_event_trigger")]
    pub event_trigger: String,
}

fn default_event_trigger() -> String {
    leadflow_common::types::LEAD_CAPTURED_EVENT.to_string()
}

/// Immutable audit record of one redirect decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsLogEntry {
    pub id: AnalyticsEntryId,
    pub email: String,
    /// Offer id, or the `default_fallback` sentinel when the configured
    /// default URL was used
    pub offer_id: String,
    pub timestamp: DateTime<Utc>,
    pub device: DeviceClass,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_lead_serializes_camel_case() {
        let attribution = Attribution {
            utm_source: Some("newsletter".to_string()),
            ..Default::default()
        };
        let lead = Lead::new("A@X.com", LeadSource::QuizFlow, attribution, None);

        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["email"], "A@X.com");
        assert_eq!(json["source"], "quiz_flow");
        assert_eq!(json["utmSource"], "newsletter");
        assert_eq!(json["status"], "captured");
        // Absent optionals are omitted entirely, matching the front-end's
        // documents.
        assert!(json.get("gclid").is_none());
    }

    #[test]
    fn test_payout_value() {
        let mut offer = Offer {
            id: "o1".to_string(),
            title: "Test".to_string(),
            url: "https://x.com".to_string(),
            weight: 1,
            is_active: true,
            popularity: 0,
            payout: "$42.50".to_string(),
        };
        assert_eq!(offer.payout_value(), 42.50);

        offer.payout = "up to 7 USD".to_string();
        assert_eq!(offer.payout_value(), 7.0);

        offer.payout = "n/a".to_string();
        assert_eq!(offer.payout_value(), 0.0);
    }

    #[test]
    fn test_smtp_profile_quota() {
        let mut profile = SmtpProfile {
            id: "p1".to_string(),
            name: "primary".to_string(),
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "u".to_string(),
            password: "s".to_string(),
            from_email: "noreply@example.com".to_string(),
            daily_limit: 2,
            current_usage: 1,
            is_active: true,
            last_reset_date: NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
        };
        assert!(profile.has_quota());

        profile.current_usage = 2;
        assert!(!profile.has_quota());

        profile.current_usage = 0;
        profile.is_active = false;
        assert!(!profile.has_quota());
    }

    #[test]
    fn test_routing_config_defaults_when_sparse() {
        let config: RoutingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.default_url, "/");
        assert_eq!(config.rule, RoutingRule::Single);
    }
}
