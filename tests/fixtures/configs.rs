// Test configuration fixtures for integration tests
//
// Provides YAML configuration strings for various test scenarios

/// Minimal valid configuration using the given template directory
pub fn minimal_config(templates_path: &str) -> String {
    format!(
        r#"
uri: "http://graphite.example.com/"
templates_path: "{}"
"#,
        templates_path
    )
}

/// Configuration with data source, filters and customized views
pub fn full_config(templates_path: &str) -> String {
    format!(
        r#"
uri: "http://YOURSERVERNAME:8080"
templates_path: "{}"
graphite_data_source: shinken
hostcheck: __HOST__
filter:
  - "Disk:/boot,/dev"
use_min: false
use_max: false
dashboard_view_font: 6
dashboard_view_width: 320
dashboard_view_height: 240
detail_view_font: 10
detail_view_width: 786
detail_view_height: 308
detail_view_line_mode: connected
"#,
        templates_path
    )
}
