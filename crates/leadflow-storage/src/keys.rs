//! Well-known document keys in the key-value store.
//!
//! Each key holds one JSON-encoded document: an array for collections,
//! an object for the routing config. The schema is shared with the
//! admin front-end, so the keys and field names are fixed.

/// Array of Lead
pub const LEADS: &str = "leads";

/// Array of Offer
pub const OFFERS: &str = "offers";

/// RoutingConfig object
pub const ROUTING_CONFIG: &str = "routing_config";

/// Array of SmtpProfile
pub const SMTP_PROFILES: &str = "smtp_profiles";

/// Array of Integration
pub const INTEGRATIONS: &str = "integrations";

/// Array of AnalyticsLogEntry, append-only
pub const ANALYTICS_LOG: &str = "analytics_log";
