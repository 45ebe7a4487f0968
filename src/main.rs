use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use serde_json::{Map, Value};

use parsehost::config::Config;
use parsehost::message::{TracingSink, handle_messages};
use parsehost::payload::{Mode, RequestPayload};
use parsehost::ParserDispatch;

const CONFIG_ENV: &str = "PARSEHOST_CONFIG";
const MODE_ENV: &str = "PARSEHOST_MODE";
const DEFAULT_CONFIG: &str = "parsehost.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::load(&config_path)?;

    let mode = std::env::var(MODE_ENV)
        .unwrap_or_else(|_| Mode::Parse.as_str().to_string())
        .parse::<Mode>()
        .map_err(anyhow::Error::msg)?;

    // Extra request fields arrive as a JSON object on stdin (may be empty).
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request fields from stdin")?;
    let fields: Map<String, Value> = if input.trim().is_empty() {
        Map::new()
    } else {
        serde_json::from_str(&input).context("request fields must be a JSON object")?
    };
    let payload = RequestPayload::with_fields(mode, fields);

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    tracing::debug!(parser = %config.parser.parser, mode = mode.as_str(), "calling parser");

    let dispatch = ParserDispatch::new();
    let response = dispatch
        .call(&config.parser, &payload, &cwd, &TracingSink)
        .await
        .inspect_err(|e| tracing::error!("{}", e.user_message()))?;

    let summary = handle_messages(&response.result_messages(), &TracingSink);
    println!("{}", serde_json::to_string_pretty(&response.result)?);

    if response.has_errors || summary.has_errors {
        anyhow::bail!("parser reported errors");
    }
    Ok(())
}
