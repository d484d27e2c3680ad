//! Attribution Extractor
//!
//! Pulls campaign-tracking parameters and a device classification out of
//! the capture request. Pure; never fails. Absent parameters map to
//! `None`, an unrecognizable user agent maps to `Desktop`.

use leadflow_common::types::{Attribution, DeviceClass};
use std::collections::HashMap;

/// Tablet patterns are checked before mobile: most tablet user agents
/// also contain a mobile marker.
const TABLET_PATTERNS: &[&str] = &["ipad", "tablet", "kindle", "silk", "playbook"];

const MOBILE_PATTERNS: &[&str] = &[
    "mobi",
    "iphone",
    "ipod",
    "android",
    "blackberry",
    "phone",
    "opera mini",
    "iemobile",
];

/// Classify a user agent into a device class
pub fn classify_device(user_agent: &str) -> DeviceClass {
    let ua = user_agent.to_lowercase();

    if TABLET_PATTERNS.iter().any(|p| ua.contains(p)) {
        DeviceClass::Tablet
    } else if MOBILE_PATTERNS.iter().any(|p| ua.contains(p)) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

/// Extract attribution from the request's query parameters and user agent
pub fn extract_attribution(
    query: &HashMap<String, String>,
    user_agent: &str,
) -> Attribution {
    let param = |name: &str| query.get(name).filter(|v| !v.is_empty()).cloned();

    Attribution {
        device: classify_device(user_agent),
        utm_source: param("utm_source"),
        utm_medium: param("utm_medium"),
        utm_campaign: param("utm_campaign"),
        utm_content: param("utm_content"),
        gclid: param("gclid"),
        fbclid: param("fbclid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
    const IPAD_UA: &str =
        "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
    const DESKTOP_UA: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
    const ANDROID_TABLET_UA: &str =
        "Mozilla/5.0 (Linux; Android 13; SM-X200) AppleWebKit/537.36 Safari/537.36 Tablet";

    #[test]
    fn test_tablet_wins_over_mobile() {
        // iPad UAs carry "Mobile" too; tablet patterns must win
        assert_eq!(classify_device(IPAD_UA), DeviceClass::Tablet);
        assert_eq!(classify_device(ANDROID_TABLET_UA), DeviceClass::Tablet);
    }

    #[test]
    fn test_mobile_and_desktop() {
        assert_eq!(classify_device(IPHONE_UA), DeviceClass::Mobile);
        assert_eq!(classify_device(DESKTOP_UA), DeviceClass::Desktop);
        assert_eq!(classify_device(""), DeviceClass::Desktop);
    }

    #[test]
    fn test_extracts_tracking_params() {
        let mut query = HashMap::new();
        query.insert("utm_source".to_string(), "newsletter".to_string());
        query.insert("utm_campaign".to_string(), "spring".to_string());
        query.insert("gclid".to_string(), "abc123".to_string());
        query.insert("unrelated".to_string(), "ignored".to_string());

        let attribution = extract_attribution(&query, DESKTOP_UA);

        assert_eq!(attribution.utm_source.as_deref(), Some("newsletter"));
        assert_eq!(attribution.utm_campaign.as_deref(), Some("spring"));
        assert_eq!(attribution.gclid.as_deref(), Some("abc123"));
        assert_eq!(attribution.utm_medium, None);
        assert_eq!(attribution.fbclid, None);
        assert_eq!(attribution.device, DeviceClass::Desktop);
    }

    #[test]
    fn test_empty_params_map_to_unset() {
        let mut query = HashMap::new();
        query.insert("utm_source".to_string(), String::new());

        let attribution = extract_attribution(&query, IPHONE_UA);
        assert_eq!(attribution.utm_source, None);
        assert_eq!(attribution.device, DeviceClass::Mobile);
    }
}
