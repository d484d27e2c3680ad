//! Common types for Leadflow

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for leads
pub type LeadId = Uuid;

/// Unique identifier for analytics log entries
pub type AnalyticsEntryId = Uuid;

/// Unique identifier for offers (admin-assigned, opaque)
pub type OfferId = String;

/// Unique identifier for SMTP profiles
pub type ProfileId = String;

/// Unique identifier for webhook integrations
pub type IntegrationId = String;

/// Sentinel offer id logged when no offer was selectable and the
/// configured default URL was used instead.
pub const DEFAULT_FALLBACK_OFFER_ID: &str = "default_fallback";

/// Event name carried by every outbound notification payload
pub const LEAD_CAPTURED_EVENT: &str = "lead_captured";

/// Where a lead was captured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    OauthSignup,
    ManualEntry,
    QuizFlow,
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadSource::OauthSignup => write!(f, "oauth_signup"),
            LeadSource::ManualEntry => write!(f, "manual_entry"),
            LeadSource::QuizFlow => write!(f, "quiz_flow"),
        }
    }
}

/// Device class derived from the user agent at capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Mobile => write!(f, "mobile"),
            DeviceClass::Tablet => write!(f, "tablet"),
            DeviceClass::Desktop => write!(f, "desktop"),
        }
    }
}

/// Delivery status of a captured lead. Starts at `Captured`; only the
/// fan-out dispatcher moves it to `Synced` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Captured,
    Synced,
    Failed,
}

/// Routing policy rule. Unrecognized values stored by older front-end
/// versions deserialize as `Single`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingRule {
    #[default]
    Single,
    Rotate,
    OfferWall,
}

impl<'de> Deserialize<'de> for RoutingRule {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "rotate" => RoutingRule::Rotate,
            "offer_wall" => RoutingRule::OfferWall,
            _ => RoutingRule::Single,
        })
    }
}

/// Campaign-tracking context extracted from the capture request.
/// Classification never fails: an unknown user agent is `Desktop` and
/// absent parameters are `None`, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default)]
    pub device: DeviceClass,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub gclid: Option<String>,
    pub fbclid: Option<String>,
}
