//! Graphite-webui - graphs of monitored hosts and services for the monitoring WebUI
//!
//! Performance data reported by checks is turned into Graphite render URLs, either through
//! host-authored `.graph` templates or generated per metric.
pub mod common;
pub mod config;
pub mod graphite;
pub mod module;
pub mod perfdata;
pub mod types;

pub use module::{get_instance, GraphiteWebui, UiModule};
