//! Performance data parsing
//!
//! Checks report their metrics as `label=value[uom];[warn];[crit];[min];[max]` items separated
//! by whitespace. Labels containing spaces are single-quoted.
use regex::Regex;
use std::sync::OnceLock;

use crate::common::normalize_metric;
use crate::types::PerfMetric;

fn metric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<value>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)(?P<uom>[^;\d\s][^;]*)?(?:;(?P<warning>[^;]*))?(?:;(?P<critical>[^;]*))?(?:;(?P<min>[^;]*))?(?:;(?P<max>[^;]*))?;*$",
        )
        .expect("valid regex")
    })
}

fn multi_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_(\d+)$").expect("valid regex"))
}

/// Split performance data into `(label, data)` items
///
/// Quoted labels may contain whitespace and `''` for a literal quote.
fn split_items(perf_data: &str) -> Vec<(String, String)> {
    let mut items = Vec::new();
    let mut chars = perf_data.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }
        let mut label = String::new();
        if chars.next_if_eq(&'\'').is_some() {
            while let Some(c) = chars.next() {
                if c == '\'' {
                    if chars.next_if_eq(&'\'').is_some() {
                        label.push('\'');
                    } else {
                        break;
                    }
                } else {
                    label.push(c);
                }
            }
        }
        // Unquoted label, or garbage after a closing quote
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            label.push(c);
        }
        let mut data = String::new();
        if chars.next_if_eq(&'=').is_some() {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                data.push(c);
            }
            items.push((label, data));
        } else {
            tracing::debug!("Ignoring perfdata item without value: {}", label);
        }
    }
    items
}

fn threshold(value: Option<regex::Match>) -> Option<f64> {
    // Ranges (10:20, @5:, ~:3) and inf/NaN can not be drawn as a line
    value
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse a performance data string into raw metrics
///
/// Items without a numeric value are skipped. Names are returned as reported by the check.
pub fn parse(perf_data: &str) -> Vec<PerfMetric> {
    let re = metric_regex();
    let mut metrics = Vec::new();
    for (label, data) in split_items(perf_data) {
        if label.is_empty() {
            continue;
        }
        let Some(caps) = re.captures(&data) else {
            tracing::debug!("Ignoring invalid perfdata item {}={}", label, data);
            continue;
        };
        let Ok(value) = caps["value"].parse::<f64>() else {
            continue;
        };
        metrics.push(PerfMetric {
            name: label,
            value,
            uom: caps
                .name("uom")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            warning: threshold(caps.name("warning")),
            critical: threshold(caps.name("critical")),
            min: threshold(caps.name("min")),
            max: threshold(caps.name("max")),
        });
    }
    metrics
}

/// Which optional values of a metric are kept
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdUsage {
    pub warning: bool,
    pub critical: bool,
    pub min: bool,
    pub max: bool,
}

impl Default for ThresholdUsage {
    fn default() -> Self {
        ThresholdUsage {
            warning: true,
            critical: true,
            min: true,
            max: true,
        }
    }
}

/// Turn a check metric name into a graphite path part
///
/// `_<n>` suffixes of multi-value metrics (`cpu_1`, `cpu_2`) become sub-nodes (`cpu.1`).
pub fn metric_path_name(name: &str) -> String {
    multi_value_regex()
        .replace(&normalize_metric(name), ".$1")
        .into_owned()
}

/// Extract the graphable metrics of a service
///
/// Metrics listed in `filtered` are ignored, names are converted into graphite path parts and
/// optional values are kept only when enabled in `usage`.
pub fn extract_metrics(
    service: &str,
    perf_data: &str,
    filtered: Option<&Vec<String>>,
    usage: ThresholdUsage,
) -> Vec<PerfMetric> {
    let mut result = Vec::new();
    for metric in parse(perf_data) {
        if let Some(filtered) = filtered {
            if filtered.contains(&metric.name) {
                tracing::warn!(
                    "Ignore metric '{}' for filtered service: {}",
                    metric.name,
                    service
                );
                continue;
            }
        }

        let name = metric_path_name(&metric.name);
        // bailout if no name
        if name.is_empty() {
            continue;
        }

        result.push(PerfMetric {
            name,
            warning: metric.warning.filter(|_| usage.warning),
            critical: metric.critical.filter(|_| usage.critical),
            min: metric.min.filter(|_| usage.min),
            max: metric.max.filter(|_| usage.max),
            ..metric
        });
    }
    tracing::debug!("Metrics of {}: {:?}", service, result);
    result
}

#[cfg(test)]
mod test {
    use crate::perfdata::*;

    #[test]
    fn test_parse_disk() {
        let metrics = parse("/=30MB;4899;4568;1234;0 /var=50MB;4899;4568;1234;0 /toto=");
        assert_eq!(metrics.len(), 2);
        assert_eq!(
            metrics[0],
            PerfMetric {
                name: "/".to_string(),
                value: 30.0,
                uom: "MB".to_string(),
                warning: Some(4899.0),
                critical: Some(4568.0),
                min: Some(1234.0),
                max: Some(0.0),
            }
        );
        assert_eq!(metrics[1].name, "/var");
        assert_eq!(metrics[1].value, 50.0);
    }

    #[test]
    fn test_parse_partial_values() {
        let metrics = parse("rta=0.043ms;;500.000 pl=0%;;;0;100 time=1.5s");
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[0].uom, "ms");
        assert_eq!(metrics[0].warning, None);
        assert_eq!(metrics[0].critical, Some(500.0));
        assert_eq!(metrics[0].min, None);
        assert_eq!(metrics[1].uom, "%");
        assert_eq!(metrics[1].min, Some(0.0));
        assert_eq!(metrics[1].max, Some(100.0));
        assert_eq!(metrics[2].value, 1.5);
        assert_eq!(metrics[2].warning, None);
    }

    #[test]
    fn test_parse_quoted_label() {
        let metrics = parse("'C:\\ used space'=10GB;20;25;0;30 'it''s'=1");
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "C:\\ used space");
        assert_eq!(metrics[0].uom, "GB");
        assert_eq!(metrics[1].name, "it's");
    }

    #[test]
    fn test_parse_ranges_and_garbage() {
        let metrics = parse("users=3;@5:10;~:20 broken novalue= =5 load=abc");
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "users");
        assert_eq!(metrics[0].warning, None);
        assert_eq!(metrics[0].critical, None);
    }

    #[test]
    fn test_parse_non_finite_thresholds() {
        let metrics = parse("temp=21;inf;NaN;-infinity;1e999 load=1;2");
        assert_eq!(metrics.len(), 2);
        assert!(metrics[0].thresholds().is_empty());
        assert_eq!(metrics[1].warning, Some(2.0));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_metric_path_name() {
        assert_eq!(metric_path_name("/"), "_");
        assert_eq!(metric_path_name("/var"), "_var");
        assert_eq!(metric_path_name("cpu_1"), "cpu.1");
        assert_eq!(metric_path_name("disk #a"), "disk__a");
        assert_eq!(metric_path_name("disk #2"), "disk_.2");
        assert_eq!(metric_path_name("used space"), "used_space");
    }

    #[test]
    fn test_extract_metrics_thresholds() {
        let metrics = extract_metrics(
            "Disk",
            "/=30MB;4899;4568;1234;0 /var=50MB;4899;4568;1234;0",
            None,
            ThresholdUsage::default(),
        );
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "_");
        assert_eq!(metrics[1].name, "_var");
        for m in metrics.iter() {
            assert_eq!(m.warning, Some(4899.0));
            assert_eq!(m.critical, Some(4568.0));
            assert_eq!(m.min, Some(1234.0));
            assert_eq!(m.max, Some(0.0));
        }

        let metrics = extract_metrics(
            "Disk",
            "/=30MB;4899;4568;1234;0",
            None,
            ThresholdUsage {
                warning: true,
                critical: false,
                min: false,
                max: true,
            },
        );
        assert_eq!(metrics[0].warning, Some(4899.0));
        assert_eq!(metrics[0].critical, None);
        assert_eq!(metrics[0].min, None);
        assert_eq!(metrics[0].max, Some(0.0));
    }

    #[test]
    fn test_extract_metrics_filtered() {
        let filtered = vec!["/boot".to_string(), "/dev".to_string()];
        let metrics = extract_metrics(
            "Disk",
            "/=30MB /boot=1MB /dev=0MB /home=2MB",
            Some(&filtered),
            ThresholdUsage::default(),
        );
        let names: Vec<&str> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["_", "_home"]);
    }
}
