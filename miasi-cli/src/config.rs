use miasi_core::{Value, config::AppConfig};
use serde_json::Value as JsonValue;
use std::path::Path;

/// Loads the application config, falling back to defaults when no file is
/// given.
pub fn load_app_config(path: Option<&Path>) -> miasi_core::InternalResult<AppConfig> {
    match path {
        Some(path) => miasi_core::config::from_file(path),
        None => Ok(AppConfig::default()),
    }
}

/// Parses a `name=value` assignment for `miasi eval`.
///
/// Numbers become numbers, `True`/`False` (any case) become booleans and
/// everything else is text.
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }
    let raw = raw.trim();
    let value = match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ if raw.eq_ignore_ascii_case("true") => Value::Boolean(true),
        _ if raw.eq_ignore_ascii_case("false") => Value::Boolean(false),
        _ => Value::Text(raw.to_string()),
    };
    Ok((name.to_string(), value))
}

/// Reads a submission payload: inline JSON, `@path` for a file, or `-` for
/// stdin.
pub fn read_payload(arg: &str) -> anyhow::Result<JsonValue> {
    let text = if arg == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path)?
    } else {
        arg.to_string()
    };
    Ok(serde_json::from_str(&text)?)
}
