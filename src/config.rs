//! Graphite WebUI module configuration
//!
//! # Example configuration
//! ```yaml
//! ---
//! uri: 'http://YOURSERVERNAME/'
//! templates_path: /etc/shinken/graphite_templates
//! graphite_data_source: shinken
//! hostcheck: __HOST__
//! filter:
//!   - 'Disk:/boot,/dev'
//! use_min: false
//! dashboard_view_font: 8
//! dashboard_view_width: 320
//! dashboard_view_height: 240
//! detail_view_font: 10
//! detail_view_width: 786
//! detail_view_height: 308
//! ```

use glob::glob;

use serde::Deserialize;
use std::{collections::HashMap, path::Path};

use config::{ConfigError, Environment, File};

/// A Configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Graphite web base URI. `YOURSERVERNAME` is replaced with the local hostname.
    pub uri: String,
    /// Service name used for the host check
    #[serde(default = "default_hostcheck")]
    pub hostcheck: String,
    /// Directory holding `.graph` templates
    #[serde(default = "default_templates_path")]
    pub templates_path: String,
    /// Optional sub-folder in graphite holding the data of a host
    #[serde(default)]
    pub graphite_data_source: String,
    /// Metrics to ignore, as `service:metric,metric`
    #[serde(default)]
    pub filter: Vec<String>,
    /// Draw the warning threshold
    #[serde(default = "default_true")]
    pub use_warning: bool,
    /// Draw the critical threshold
    #[serde(default = "default_true")]
    pub use_critical: bool,
    /// Draw the min value
    #[serde(default = "default_true")]
    pub use_min: bool,
    /// Draw the max value
    #[serde(default = "default_true")]
    pub use_max: bool,
    /// Font size of dashboard widget graphs
    #[serde(default = "default_font")]
    pub dashboard_view_font: u32,
    /// Width of dashboard widget graphs
    #[serde(default = "default_dashboard_width")]
    pub dashboard_view_width: u32,
    /// Height of dashboard widget graphs
    #[serde(default = "default_dashboard_height")]
    pub dashboard_view_height: u32,
    /// Graphite `lineMode` of dashboard widget graphs
    pub dashboard_view_line_mode: Option<String>,
    /// Font size of element view graphs
    #[serde(default = "default_font")]
    pub detail_view_font: u32,
    /// Width of element view graphs
    #[serde(default = "default_detail_width")]
    pub detail_view_width: u32,
    /// Height of element view graphs
    #[serde(default = "default_detail_height")]
    pub detail_view_height: u32,
    /// Graphite `lineMode` of element view graphs
    pub detail_view_line_mode: Option<String>,
}

impl Config {
    /// Returns a configuration object from a yaml config file path with merged values from
    /// environment variables prefixed with "GRAPHITE_UI". When setting values in the environment
    /// variables use "__" for sublements separator and ";" between filter entries.
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let path = Path::new(config_file).canonicalize().map_err(|e| {
            ConfigError::Message(format!("Can not resolve path to {}: {}", config_file, e))
        })?;
        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigError::Message(format!("Invalid config path {:?}", path)))?;
        let mut s = config::Config::builder()
            // Start off by merging in the requested configuration file
            .add_source(File::with_name(path_str));

        // Read and merge conf.d config parts
        if let Some(parent) = path.parent().and_then(|p| p.to_str()) {
            let configs_glob = format!("{}/conf.d/*.yaml", parent);
            tracing::trace!("Analyzing {:?} as conf.d parts", configs_glob);
            let entries =
                glob(configs_glob.as_str()).map_err(|e| ConfigError::Foreign(Box::new(e)))?;
            for entry in entries {
                tracing::debug!("Add {:?} config part file", entry);
                if let Ok(part) = entry {
                    if let Some(part) = part.to_str() {
                        s = s.add_source(File::with_name(part));
                    }
                }
            }
        }

        // GRAPHITE_UI_DETAIL_VIEW_FONT goes to detail_view_font
        s = s.add_source(
            Environment::with_prefix("GRAPHITE_UI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(";")
                .with_list_parse_key("filter"),
        );

        s.build()?.try_deserialize()
    }

    /// Returns a configuration object from a string representing configuration file
    pub fn from_config_str(data: &str) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(File::from_str(data, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    /// Returns the configured metric filters grouped by service
    ///
    /// Every entry has the form `service:metric,metric`.
    pub fn filtered_metrics(&self) -> Result<HashMap<String, Vec<String>>, String> {
        let mut filtered: HashMap<String, Vec<String>> = HashMap::new();
        for entry in self.filter.iter() {
            let (service, metrics) = entry
                .split_once(':')
                .ok_or_else(|| format!("Invalid metric filter '{}'", entry))?;
            filtered
                .entry(service.to_string())
                .or_default()
                .extend(metrics.split(',').map(|m| m.to_string()));
        }
        Ok(filtered)
    }
}

fn default_hostcheck() -> String {
    "__HOST__".to_string()
}

fn default_templates_path() -> String {
    "/tmp".to_string()
}

fn default_true() -> bool {
    true
}

fn default_font() -> u32 {
    8
}

fn default_dashboard_width() -> u32 {
    320
}

fn default_dashboard_height() -> u32 {
    240
}

fn default_detail_width() -> u32 {
    586
}

fn default_detail_height() -> u32 {
    308
}
