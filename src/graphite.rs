//! Graphite render URL module
//!
//! Programmatic representation of the Graphite render API query string
//!
use std::collections::HashMap;
use std::fmt;

use crate::common::graphite_time;
use crate::config::Config;

/// Name of the style used when a view has no style of its own
pub const DEFAULT_STYLE: &str = "default";

/// Presentation parameters of a graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphStyle {
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub line_style: Option<String>,
}

impl Default for GraphStyle {
    fn default() -> Self {
        GraphStyle {
            width: 586,
            height: 308,
            font_size: 8,
            line_style: None,
        }
    }
}

impl fmt::Display for GraphStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "width={}&height={}&fontSize={}",
            self.width, self.height, self.font_size
        )?;
        if let Some(line_style) = &self.line_style {
            write!(f, "&lineMode={}", line_style)?;
        }
        Ok(())
    }
}

/// Graph styles by view name
#[derive(Clone, Debug)]
pub struct GraphStyles {
    styles: HashMap<String, GraphStyle>,
}

impl GraphStyles {
    /// Styles for the "dashboard" and "detail" views
    pub fn from_config(config: &Config) -> Self {
        let mut styles = HashMap::new();
        styles.insert(DEFAULT_STYLE.to_string(), GraphStyle::default());
        // Font and picture size for dashboard widget
        styles.insert(
            "dashboard".to_string(),
            GraphStyle {
                width: config.dashboard_view_width,
                height: config.dashboard_view_height,
                font_size: config.dashboard_view_font,
                line_style: config.dashboard_view_line_mode.clone(),
            },
        );
        // Font and picture size for element view
        styles.insert(
            "detail".to_string(),
            GraphStyle {
                width: config.detail_view_width,
                height: config.detail_view_height,
                font_size: config.detail_view_font,
                line_style: config.detail_view_line_mode.clone(),
            },
        );
        GraphStyles { styles }
    }

    /// Get the style of a view, falling back to the default one
    pub fn get(&self, name: &str) -> GraphStyle {
        match self.styles.get(name) {
            Some(style) => style.clone(),
            None => {
                tracing::warn!("No style {}, falling back to default", name);
                self.styles.get(DEFAULT_STYLE).cloned().unwrap_or_default()
            }
        }
    }
}

/// Graphite render URL
#[derive(Clone, Debug, Default)]
pub struct GraphiteUrl {
    pub server: String,
    pub title: String,
    pub style: GraphStyle,
    start: String,
    end: String,
    pub targets: Vec<String>,
}

impl GraphiteUrl {
    pub fn new(server: &str, title: &str, style: GraphStyle, start: &str, end: &str) -> Self {
        GraphiteUrl {
            server: server.to_string(),
            title: title.to_string(),
            style,
            start: graphite_time(start),
            end: graphite_time(end),
            targets: Vec::new(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn add_target(&mut self, target: String) {
        self.targets.push(target);
    }

    pub fn target_string(&self) -> String {
        self.targets
            .iter()
            .map(|t| format!("target={}", t))
            .collect::<Vec<String>>()
            .join("&")
    }
}

impl fmt::Display for GraphiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}render/?{}&from={}&until={}&title={}&{}",
            self.server,
            self.style,
            self.start,
            self.end,
            self.title,
            self.target_string()
        )
    }
}

/// Wrap a graphite query into an alias
pub fn alias_graphite_query(query: &str, alias: &str) -> String {
    format!("alias({},\"{}\")", query, alias)
}

/// Horizontal line series at `value`
pub fn constant_line(value: f64, alias: &str) -> String {
    alias_graphite_query(&format!("constantLine({})", value), alias)
}
