//! Common methods
//!
use chrono::{Local, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

use crate::types::ModuleError;

/// Placeholder in the configured URI replaced with the local hostname
pub const SERVER_NAME_PLACEHOLDER: &str = "YOURSERVERNAME";

fn illegal_char_metric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Dots are allowed, they separate graphite nodes
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_.\-]").expect("valid regex"))
}

fn font_size_param() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"fontSize=[^&]*").expect("valid regex"))
}

/// Replace all characters not allowed in a graphite path with "_"
pub fn normalize_metric(metric: &str) -> String {
    illegal_char_metric().replace_all(metric, "_").into_owned()
}

/// Convert a unix timestamp into graphite time format
///
/// Values which are not a timestamp are assumed to be graphite compatible already (`-1d`,
/// `now`, ...) and returned unchanged.
pub fn graphite_time(value: &str) -> String {
    match value.trim().parse::<i64>() {
        Ok(ts) => match Local.timestamp_opt(ts, 0).single() {
            Some(dt) => dt.format("%H:%M_%Y%m%d").to_string(),
            None => value.to_string(),
        },
        Err(_) => value.to_string(),
    }
}

/// Set the fontSize parameter of the url, adding it when not present
pub fn replace_font_size(url: &str, font_size: u32) -> String {
    if url.contains("fontSize=") {
        font_size_param()
            .replace_all(url, format!("fontSize={}", font_size).as_str())
            .into_owned()
    } else {
        format!("{}&fontSize={}", url, font_size)
    }
}

/// Validate the configured graphite URI
///
/// The URI must not be empty, always ends with "/" and gets `YOURSERVERNAME` replaced with
/// `server_name` when known.
pub fn normalize_base_uri(value: &str, server_name: Option<&str>) -> Result<String, ModuleError> {
    let mut uri = value.trim().to_string();
    if uri.is_empty() {
        return Err(ModuleError::InvalidUri(value.to_string()));
    }
    if !uri.ends_with('/') {
        uri.push('/');
    }
    if uri.contains(SERVER_NAME_PLACEHOLDER) {
        match server_name {
            Some(name) => uri = uri.replace(SERVER_NAME_PLACEHOLDER, name),
            None => tracing::warn!("Can not determine local hostname, keeping uri {}", uri),
        }
    }
    Ok(uri)
}

#[cfg(test)]
mod test {
    use crate::common::*;

    #[test]
    fn test_normalize_metric() {
        assert_eq!(normalize_metric("/var"), "_var");
        assert_eq!(normalize_metric("disk #1 used"), "disk__1_used");
        assert_eq!(normalize_metric("srv-01.dc_2"), "srv-01.dc_2");
        assert_eq!(normalize_metric("é"), "_");
    }

    #[test]
    fn test_graphite_time() {
        let expected = Local
            .timestamp_opt(1_700_000_000, 0)
            .unwrap()
            .format("%H:%M_%Y%m%d")
            .to_string();
        assert_eq!(graphite_time("1700000000"), expected);
        assert_eq!(graphite_time("-1d"), "-1d");
        assert_eq!(graphite_time("now"), "now");
    }

    #[test]
    fn test_replace_font_size() {
        assert_eq!(
            replace_font_size("http://g/render/?target=a", 8),
            "http://g/render/?target=a&fontSize=8"
        );
        assert_eq!(
            replace_font_size("http://g/render/?fontSize=12&target=a", 8),
            "http://g/render/?fontSize=8&target=a"
        );
        assert_eq!(
            replace_font_size("http://g/render/?target=a&fontSize=12", 10),
            "http://g/render/?target=a&fontSize=10"
        );
        // empty value is replaced, not duplicated
        assert_eq!(
            replace_font_size("http://g/render/?fontSize=&target=a", 8),
            "http://g/render/?fontSize=8&target=a"
        );
        assert_eq!(
            replace_font_size("http://g/render/?target=a&fontSize=", 8),
            "http://g/render/?target=a&fontSize=8"
        );
    }

    #[test]
    fn test_normalize_base_uri() {
        assert_eq!(
            normalize_base_uri("http://x/YOURSERVERNAME/", Some("h1")).unwrap(),
            "http://x/h1/"
        );
        assert_eq!(
            normalize_base_uri(" http://YOURSERVERNAME ", Some("h1")).unwrap(),
            "http://h1/"
        );
        assert_eq!(
            normalize_base_uri("http://graphite:8080", None).unwrap(),
            "http://graphite:8080/"
        );
        assert_eq!(
            normalize_base_uri("http://YOURSERVERNAME/", None).unwrap(),
            "http://YOURSERVERNAME/"
        );
        assert!(matches!(
            normalize_base_uri("   ", Some("h1")),
            Err(ModuleError::InvalidUri(_))
        ));
    }
}
