// Test helper functions
//
// Provides utilities for building template trees, modules and monitored elements

use graphite_webui::{
    config::Config,
    types::{Element, Host, Service, GRAPHITE_POST, GRAPHITE_PRE},
    GraphiteWebui,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Creates a temporary template directory with the given `(relative path, content)` files
///
/// # Example
/// ```
/// let dir = create_templates(&[("detail/check_disk.graph", "$uri$host.$service")]);
/// ```
pub fn create_templates(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::Builder::new().tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
    dir
}

/// Creates a module from the configuration, using `h1` as local hostname
pub fn create_module(config: &str) -> GraphiteWebui {
    let config = Config::from_config_str(config).unwrap();
    GraphiteWebui::with_server_name(&config, Some("h1")).unwrap()
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Creates a host with an optional graphite prefix
pub fn create_host(host_name: &str, prefix: Option<&str>, perf_data: &str) -> Host {
    let mut customs = HashMap::new();
    if let Some(prefix) = prefix {
        customs.insert(GRAPHITE_PRE.to_string(), prefix.to_string());
    }
    Host {
        host_name: host_name.to_string(),
        customs,
        check_command: "check-host-alive".to_string(),
        perf_data: perf_data.to_string(),
    }
}

/// Creates a service element with an optional graphite postfix
pub fn create_service(
    host: Host,
    description: &str,
    check_command: &str,
    postfix: Option<&str>,
    perf_data: &str,
) -> Element {
    let mut customs = HashMap::new();
    if let Some(postfix) = postfix {
        customs.insert(GRAPHITE_POST.to_string(), postfix.to_string());
    }
    Element::Service(Service {
        host,
        service_description: description.to_string(),
        customs,
        check_command: check_command.to_string(),
        perf_data: perf_data.to_string(),
    })
}
