use anyhow::{Result, anyhow};
use fragments_sdk::{Params, Value};

/// Parse a `name=value` call parameter.
///
/// Values that read as integers become integer values, anything else is text.
pub fn parse_param(arg: &str) -> Result<(String, Value)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got '{}'", arg))?;

    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(anyhow!("Parameter name '{}' must be lowercase letters only", name));
    }

    let value = match value.parse::<i64>() {
        Ok(number) => Value::Integer(number),
        Err(_) => Value::Text(value.to_string()),
    };
    Ok((name.to_string(), value))
}

/// Collect parsed parameters, with `id` set when given
pub fn to_params(id: Option<&str>, pairs: &[(String, Value)]) -> Params {
    let mut params: Params = pairs.iter().cloned().collect();
    if let Some(id) = id {
        params.insert("id", id);
    }
    params
}
