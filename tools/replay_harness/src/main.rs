use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use restrict_core::{CommandReply, RestrictConfig, RestrictConfigMetadata, RestrictEngine};
use restrict_runtime::{acquire_event_schema, parse_command_line};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay restrict command scripts against a config", long_about = None)]
struct Args {
    /// Path to restrict config JSON (defaults to the built-in config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Script of command lines, one per line; `#` starts a comment
    #[arg(long, required_unless_present = "schema")]
    script: Option<PathBuf>,

    /// Map to start before the first script line
    #[arg(long)]
    map: Option<String>,

    /// Keep going after a line fails to parse or apply
    #[arg(long, default_value_t = false)]
    keep_going: bool,

    /// Print the acquire event JSON schema and exit
    #[arg(long, default_value_t = false)]
    schema: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.schema {
        println!("{}", serde_json::to_string_pretty(&acquire_event_schema())?);
        return Ok(());
    }

    let mut engine = build_engine(args.config.as_ref())?;
    if let Some(map) = args.map.as_deref() {
        engine.on_map_start(Some(map));
    }

    let script_path = args
        .script
        .as_ref()
        .context("--script is required unless --schema is given")?;
    let script = fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script at {}", script_path.display()))?;

    for (index, raw) in script.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = index + 1;
        let outcome = parse_command_line(line)
            .with_context(|| format!("line {line_no}: failed to parse `{line}`"))
            .and_then(|payload| {
                engine
                    .apply_command(payload)
                    .with_context(|| format!("line {line_no}: command failed"))
            });
        let reply = match outcome {
            Ok(reply) => reply_json(&reply)?,
            Err(err) if args.keep_going => json!({ "kind": "error", "message": format!("{err:#}") }),
            Err(err) => return Err(err),
        };
        println!("{}", json!({ "line": line_no, "input": line, "reply": reply }));
    }

    println!("=== metrics ===");
    println!("{}", serde_json::to_string_pretty(engine.metrics())?);
    Ok(())
}

fn build_engine(config_path: Option<&PathBuf>) -> Result<RestrictEngine> {
    let Some(path) = config_path else {
        return Ok(RestrictEngine::new(RestrictConfig::builtin()));
    };
    let path = path
        .canonicalize()
        .with_context(|| format!("Unable to canonicalize config path {}", path.display()))?;
    let config = RestrictConfig::from_file(&path)
        .with_context(|| format!("Failed to load restrict config at {}", path.display()))?;
    Ok(RestrictEngine::with_metadata(
        Arc::new(config),
        RestrictConfigMetadata::new(Some(path)),
    ))
}

fn reply_json(reply: &CommandReply) -> Result<serde_json::Value> {
    serde_json::to_value(reply).context("Failed to serialize reply")
}
