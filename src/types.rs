//! Graphite WebUI types
//!
//! Monitored elements as handed over by the host, results returned to it and error definitions
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Custom variable holding the graphite prefix of a host
pub const GRAPHITE_PRE: &str = "_GRAPHITE_PRE";
/// Custom variable holding the graphite postfix of a service
pub const GRAPHITE_POST: &str = "_GRAPHITE_POST";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Host {
    pub host_name: String,
    #[serde(default)]
    pub customs: HashMap<String, String>,
    #[serde(default)]
    pub check_command: String,
    #[serde(default)]
    pub perf_data: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Service {
    pub host: Host,
    pub service_description: String,
    #[serde(default)]
    pub customs: HashMap<String, String>,
    #[serde(default)]
    pub check_command: String,
    #[serde(default)]
    pub perf_data: String,
}

/// Monitored element a graph is requested for
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Host(Host),
    Service(Service),
}

impl Element {
    pub fn host_name(&self) -> &str {
        match self {
            Element::Host(h) => &h.host_name,
            Element::Service(s) => &s.host.host_name,
        }
    }

    pub fn service_description(&self) -> Option<&str> {
        match self {
            Element::Host(_) => None,
            Element::Service(s) => Some(&s.service_description),
        }
    }

    pub fn customs(&self) -> &HashMap<String, String> {
        match self {
            Element::Host(h) => &h.customs,
            Element::Service(s) => &s.customs,
        }
    }

    /// Custom variables of the host owning the element
    pub fn host_customs(&self) -> &HashMap<String, String> {
        match self {
            Element::Host(h) => &h.customs,
            Element::Service(s) => &s.host.customs,
        }
    }

    pub fn check_command(&self) -> &str {
        match self {
            Element::Host(h) => &h.check_command,
            Element::Service(s) => &s.check_command,
        }
    }

    pub fn perf_data(&self) -> &str {
        match self {
            Element::Host(h) => &h.perf_data,
            Element::Service(s) => &s.perf_data,
        }
    }
}

/// Single metric of a performance data string
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PerfMetric {
    pub name: String,
    pub value: f64,
    pub uom: String,
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PerfMetric {
    /// Threshold values with their graph labels, in drawing order
    pub fn thresholds(&self) -> Vec<(&'static str, f64)> {
        [
            ("Warning", self.warning),
            ("Critical", self.critical),
            ("Min", self.min),
            ("Max", self.max),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

/// Graph image and the page it links to
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphUri {
    pub link: String,
    pub img_src: String,
}

/// Navigation link to the Graphite UI
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UiLink {
    pub label: String,
    pub uri: String,
}

/// Errors preventing the module from being instantiated
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("Invalid URI provided to the WebUI Graphite module: '{0}'")]
    InvalidUri(String),
    #[error("Invalid metric filter configuration: {0}")]
    InvalidFilter(String),
}

/// Errors while building graph URIs
#[derive(Debug, thiserror::Error)]
pub enum UriError {
    #[error("Can not read template {path:?}: {source}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Can not render template {path:?}: {reason}")]
    TemplateRender { path: PathBuf, reason: String },
}
