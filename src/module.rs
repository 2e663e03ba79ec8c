//! Graphite WebUI module
//!
//! Links the monitoring WebUI with Graphite: builds the graph images and links shown for hosts
//! and services. Graphs come from a `.graph` template matching the element check command when
//! one exists, otherwise one graph per performance data metric is generated.
use new_string_template::template::Template;
use regex::Regex;
use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::common::{graphite_time, normalize_base_uri, normalize_metric, replace_font_size};
use crate::config::Config;
use crate::graphite::{alias_graphite_query, constant_line, GraphStyles, GraphiteUrl};
use crate::perfdata::{extract_metrics, ThresholdUsage};
use crate::types::{
    Element, GraphUri, ModuleError, PerfMetric, UiLink, UriError, GRAPHITE_POST, GRAPHITE_PRE,
};

/// Host application handle given to the module on load
pub type HostApp = Arc<dyn Any + Send + Sync>;

/// View used when the host does not name one
pub const DEFAULT_SOURCE: &str = "detail";

/// Module registration properties
pub struct ModuleProperties {
    pub daemons: &'static [&'static str],
    pub module_type: &'static str,
}

pub const MODULE_PROPERTIES: ModuleProperties = ModuleProperties {
    daemons: &["webui"],
    module_type: "graphite_webui",
};

/// Graph UI module contract of the WebUI
pub trait UiModule {
    /// Lifecycle hook called before load
    fn init(&mut self) {}
    /// Receive the WebUI application
    fn load(&mut self, app: HostApp);
    /// Link to the graphing UI
    fn get_external_ui_link(&self) -> UiLink;
    /// Graph images and links for a host or service
    fn get_graph_uris(&self, elt: &Element, start: &str, end: &str, source: &str)
        -> Vec<GraphUri>;
}

fn template_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // $$, $name or ${name}; the key keeps the braces
    RE.get_or_init(|| {
        Regex::new(r"\$(\$|[A-Za-z_][A-Za-z0-9_]*|\{[A-Za-z_][A-Za-z0-9_]*\})")
            .expect("valid regex")
    })
}

fn template_dollar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(\$|[A-Za-z_][A-Za-z0-9_]*|\{[A-Za-z_][A-Za-z0-9_]*\})?")
            .expect("valid regex")
    })
}

/// Position of the first `$` not starting a placeholder (`${host`, `$1`, trailing `$`)
fn invalid_placeholder(template: &str) -> Option<usize> {
    template_dollar()
        .captures_iter(template)
        .find(|caps| caps.get(1).is_none())
        .and_then(|caps| caps.get(0))
        .map(|m| m.start())
}

/// Template values for both `$name` and `${name}` forms, `$$` is a literal `$`
fn template_vars<'a>(values: &[(&'a str, &'a str)]) -> HashMap<String, &'a str> {
    let mut vars = HashMap::from([("$".to_string(), "$")]);
    for (name, value) in values {
        vars.insert(name.to_string(), *value);
        vars.insert(format!("{{{}}}", name), *value);
    }
    vars
}

/// Called by the module manager
pub fn get_instance(config: &Config) -> Result<GraphiteWebui, ModuleError> {
    tracing::info!("Get a graphite UI data module");
    GraphiteWebui::new(config)
}

pub struct GraphiteWebui {
    uri: String,
    hostcheck: String,
    templates_path: PathBuf,
    graphite_data_source: String,
    filtered_metrics: HashMap<String, Vec<String>>,
    usage: ThresholdUsage,
    styles: GraphStyles,
    app: Option<HostApp>,
}

impl GraphiteWebui {
    pub fn new(config: &Config) -> Result<Self, ModuleError> {
        let server_name = sysinfo::System::host_name();
        Self::with_server_name(config, server_name.as_deref())
    }

    /// Build the module using `server_name` in place of `YOURSERVERNAME`
    pub fn with_server_name(config: &Config, server_name: Option<&str>) -> Result<Self, ModuleError> {
        let uri = normalize_base_uri(&config.uri, server_name)?;
        tracing::info!("Configuration - uri: {}", uri);
        tracing::info!("Configuration - templates path: {}", config.templates_path);
        tracing::info!(
            "Configuration - Graphite data source: {}",
            config.graphite_data_source
        );

        let filtered_metrics = config
            .filtered_metrics()
            .map_err(ModuleError::InvalidFilter)?;
        for (service, metrics) in filtered_metrics.iter() {
            tracing::info!("Configuration - Filtered metric: {} - {:?}", service, metrics);
        }

        let usage = ThresholdUsage {
            warning: config.use_warning,
            critical: config.use_critical,
            min: config.use_min,
            max: config.use_max,
        };
        tracing::info!("Configuration - use metrics: {:?}", usage);

        Ok(GraphiteWebui {
            uri,
            hostcheck: config.hostcheck.clone(),
            templates_path: PathBuf::from(&config.templates_path),
            graphite_data_source: config.graphite_data_source.clone(),
            filtered_metrics,
            usage,
            styles: GraphStyles::from_config(config),
            app: None,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn app(&self) -> Option<&HostApp> {
        self.app.as_ref()
    }

    /// Graphable metrics of a service performance data
    pub fn get_metric_and_value(&self, service: &str, perf_data: &str) -> Vec<PerfMetric> {
        extract_metrics(
            service,
            perf_data,
            self.filtered_metrics.get(service),
            self.usage,
        )
    }

    /// Host name and service name of the element; hosts use the hostcheck name
    pub fn element_names<'a>(&'a self, elt: &'a Element) -> (&'a str, &'a str) {
        let service = elt.service_description().unwrap_or(self.hostcheck.as_str());
        (elt.host_name(), service)
    }

    /// Graphite prefix of the element host
    pub fn graphite_pre(&self, elt: &Element) -> String {
        match elt.host_customs().get(GRAPHITE_PRE) {
            Some(pre) => normalize_metric(&format!("{}.", pre)),
            None => String::new(),
        }
    }

    /// Graphite postfix of a service
    pub fn graphite_post(&self, elt: &Element) -> String {
        match elt {
            Element::Service(s) => match s.customs.get(GRAPHITE_POST) {
                Some(post) => normalize_metric(&format!(".{}", post)),
                None => String::new(),
            },
            Element::Host(_) => String::new(),
        }
    }

    pub fn data_source(&self) -> String {
        if self.graphite_data_source.is_empty() {
            String::new()
        } else {
            format!(".{}", self.graphite_data_source)
        }
    }

    /// Find the template of the element check command for a view
    ///
    /// `<source>/<command>.graph` is preferred over `<command>.graph`. For commands with
    /// arguments (check_nrpe!check_disk) `<command>_<arg>.graph` is tried afterwards, again the
    /// view specific one first.
    pub fn template_path(&self, elt: &Element, source: &str) -> Option<PathBuf> {
        let command_parts: Vec<&str> = elt.check_command().split('!').collect();
        if command_parts[0].is_empty() {
            return None;
        }
        let mut filenames = vec![format!("{}.graph", command_parts[0])];
        if let Some(arg) = command_parts.get(1) {
            filenames.push(format!("{}_{}.graph", command_parts[0], arg));
        }
        for filename in filenames.iter() {
            for dir in [self.templates_path.join(source), self.templates_path.clone()] {
                let template_file = dir.join(filename);
                tracing::debug!("Checking for template at {:?}", template_file);
                if template_file.is_file() {
                    return Some(template_file);
                }
            }
        }
        let (hostname, service) = self.element_names(elt);
        tracing::debug!("No template found for {}/{}", hostname, service);
        None
    }

    /// Graph URIs from the element template, `None` when there is no template
    fn uris_from_file(
        &self,
        elt: &Element,
        start: &str,
        end: &str,
        source: &str,
    ) -> Result<Option<Vec<GraphUri>>, UriError> {
        let Some(template_file) = self.template_path(elt, source) else {
            return Ok(None);
        };
        tracing::debug!("Found template: {:?}", template_file);
        let uris = self.render_template(&template_file, elt, start, end, source)?;
        Ok(Some(uris))
    }

    fn render_template(
        &self,
        template_file: &Path,
        elt: &Element,
        start: &str,
        end: &str,
        source: &str,
    ) -> Result<Vec<GraphUri>, UriError> {
        let content = fs::read_to_string(template_file).map_err(|e| UriError::TemplateRead {
            path: template_file.to_path_buf(),
            source: e,
        })?;

        let (hostname, service) = self.element_names(elt);
        let start = graphite_time(start);
        let end = graphite_time(end);
        let style = self.styles.get(source);

        let host = normalize_metric(&format!(
            "{}{}{}",
            self.graphite_pre(elt),
            hostname,
            self.data_source()
        ));
        let service = normalize_metric(&format!("{}{}", service, self.graphite_post(elt)));
        if let Some(pos) = invalid_placeholder(&content) {
            return Err(UriError::TemplateRender {
                path: template_file.to_path_buf(),
                reason: format!("Invalid placeholder at position {}", pos),
            });
        }
        let values = template_vars(&[
            ("uri", self.uri.as_str()),
            ("host", host.as_str()),
            ("service", service.as_str()),
        ]);
        let vars: HashMap<&str, &str> = values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let rendered = Template::new(content)
            .with_regex(template_placeholder())
            .render(&vars)
            .map_err(|e| UriError::TemplateRender {
                path: template_file.to_path_buf(),
                reason: e.to_string(),
            })?;

        // One image per line
        Ok(rendered
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|img| GraphUri {
                link: self.uri.clone(),
                img_src: replace_font_size(
                    &format!("{}&from={}&until={}", img.replace('"', "'"), start, end),
                    style.font_size,
                ),
            })
            .collect())
    }

    /// One graph per metric of the element performance data
    fn generate_graph_uris(
        &self,
        elt: &Element,
        start: &str,
        end: &str,
        source: &str,
    ) -> Vec<GraphUri> {
        let (hostname, service) = self.element_names(elt);
        let metrics = self.get_metric_and_value(service, elt.perf_data());

        if metrics.is_empty() {
            tracing::warn!("No perfdata found to graph for {}/{}", hostname, service);
            return Vec::new();
        }

        let style = self.styles.get(source);
        let pre = self.graphite_pre(elt);
        let post = self.graphite_post(elt);
        let data_source = self.data_source();
        let mut uris = Vec::new();
        for metric in metrics.iter() {
            tracing::debug!("metric: {:?}", metric);
            let title = format!("{}/{} - {}", hostname, service, metric.name);
            let mut graph = GraphiteUrl::new(&self.uri, &title, style.clone(), start, end);

            // Graph main series
            let graphite_metric = format!(
                "{}{}{}.{}.{}{}",
                pre,
                normalize_metric(hostname),
                data_source,
                normalize_metric(service),
                metric.name,
                post
            );
            graph.add_target(alias_graphite_query(&graphite_metric, &metric.name));

            for (label, value) in metric.thresholds() {
                graph.add_target(constant_line(value, label));
            }

            let uri = GraphUri {
                link: self.uri.clone(),
                img_src: graph.to_string(),
            };
            tracing::debug!("uri: {} / {}", uri.link, uri.img_src);
            uris.push(uri);
        }
        uris
    }
}

impl UiModule for GraphiteWebui {
    fn load(&mut self, app: HostApp) {
        self.app = Some(app);
    }

    fn get_external_ui_link(&self) -> UiLink {
        UiLink {
            label: "Graphite".to_string(),
            uri: self.uri.clone(),
        }
    }

    fn get_graph_uris(
        &self,
        elt: &Element,
        start: &str,
        end: &str,
        source: &str,
    ) -> Vec<GraphUri> {
        tracing::debug!("get graphs URI for {} ({} view)", elt.host_name(), source);

        match self.uris_from_file(elt, start, end, source) {
            Ok(Some(uris)) => uris,
            Ok(None) => self.generate_graph_uris(elt, start, end, source),
            Err(e) => {
                tracing::error!("Error while generating graph uris: {}", e);
                Vec::new()
            }
        }
    }
}
