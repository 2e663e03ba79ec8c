// Build script to generate JSON schema for configuration

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// Re-define the Config struct with JsonSchema derive
// This is a simplified version matching the actual Config struct

/// Graphite WebUI module configuration
#[allow(dead_code)]
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct Config {
    /// Graphite web base URI, `YOURSERVERNAME` is replaced with the local hostname
    pub uri: String,
    /// Service name used for host checks (default: __HOST__)
    pub hostcheck: Option<String>,
    /// Directory holding `.graph` templates (default: /tmp)
    pub templates_path: Option<String>,
    /// Sub-folder in graphite holding the data of a host (default: empty)
    pub graphite_data_source: Option<String>,
    /// Ignored metrics, as `service:metric,metric`
    pub filter: Option<Vec<String>>,
    /// Draw warning thresholds (default: true)
    pub use_warning: Option<bool>,
    /// Draw critical thresholds (default: true)
    pub use_critical: Option<bool>,
    /// Draw min values (default: true)
    pub use_min: Option<bool>,
    /// Draw max values (default: true)
    pub use_max: Option<bool>,
    /// Dashboard graph font size (default: 8)
    pub dashboard_view_font: Option<u32>,
    /// Dashboard graph width (default: 320)
    pub dashboard_view_width: Option<u32>,
    /// Dashboard graph height (default: 240)
    pub dashboard_view_height: Option<u32>,
    /// Dashboard graph Graphite lineMode
    pub dashboard_view_line_mode: Option<String>,
    /// Element view graph font size (default: 8)
    pub detail_view_font: Option<u32>,
    /// Element view graph width (default: 586)
    pub detail_view_width: Option<u32>,
    /// Element view graph height (default: 308)
    pub detail_view_height: Option<u32>,
    /// Element view graph Graphite lineMode
    pub detail_view_line_mode: Option<String>,
}

fn main() {
    println!("cargo:rerun-if-changed=src/config.rs");

    // Generate JSON schema
    let schema = schema_for!(Config);
    let schema_json = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema");

    // Create doc/schemas directory if it doesn't exist
    let schemas_dir = Path::new("doc/schemas");
    if !schemas_dir.exists() {
        fs::create_dir_all(schemas_dir).expect("Failed to create doc/schemas directory");
    }

    // Write schema to file
    let schema_path = schemas_dir.join("config-schema.json");
    fs::write(&schema_path, schema_json).expect("Failed to write config-schema.json");
}
