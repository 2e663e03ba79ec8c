//! graphite-webui-uris - print the graph URIs the WebUI would show for an element.
//!
//! Reads one host or service as JSON from stdin and writes the generated `{link, img_src}`
//! list as JSON to stdout.
//!
//! ```text
//! graphite-webui-uris --config config.yaml --source dashboard --start -1d --end now < element.json
//! ```
use std::io::Read;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graphite_webui::config::Config;
use graphite_webui::module::DEFAULT_SOURCE;
use graphite_webui::types::Element;
use graphite_webui::{get_instance, UiModule};

#[derive(Parser)]
#[command(name = "graphite-webui-uris")]
#[command(about = "Print the Graphite graph URIs of a host or service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Module configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// WebUI view the graphs are shown in (dashboard, detail)
    #[arg(short, long, default_value = DEFAULT_SOURCE)]
    source: String,

    /// Graph start, unix timestamp or graphite time
    #[arg(long, default_value = "-1d", allow_hyphen_values = true)]
    start: String,

    /// Graph end, unix timestamp or graphite time
    #[arg(long, default_value = "now", allow_hyphen_values = true)]
    end: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout is reserved for the result
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::new(&args.config)
        .with_context(|| format!("Can not load configuration {}", args.config))?;
    let mut webui = get_instance(&config)?;
    webui.init();
    tracing::debug!("Graphite at {}", webui.uri());

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Can not read element from stdin")?;
    let element: Element = serde_json::from_str(&input).context("Invalid element")?;

    let uris = webui.get_graph_uris(&element, &args.start, &args.end, &args.source);
    tracing::debug!("Generated {} uris", uris.len());
    println!("{}", serde_json::to_string_pretty(&uris)?);
    Ok(())
}
