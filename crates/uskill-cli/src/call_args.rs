use serde_json::{Number, Value};
use uskill_client::SkillParams;

/// Turns `key=value` arguments into a skill parameter object.
///
/// Arguments without `=` are skipped. Later duplicates replace earlier ones.
pub fn parse_call_params(raw_args: &[String]) -> SkillParams {
    let mut params = SkillParams::new();
    for raw in raw_args {
        let Some((key, value)) = raw.split_once('=') else {
            tracing::warn!(argument = raw.as_str(), "ignoring argument without '='");
            continue;
        };
        params.insert(key.to_string(), parse_scalar(value));
    }
    params
}

/// Numbers become JSON numbers (integers when integral), everything else
/// stays a string.
pub fn parse_scalar(raw: &str) -> Value {
    let Ok(parsed) = raw.trim().parse::<f64>() else {
        return Value::String(raw.to_string());
    };
    if !parsed.is_finite() {
        return Value::String(raw.to_string());
    }
    if parsed.fract() == 0.0 && parsed.abs() < 9.0e15 {
        return Value::from(parsed as i64);
    }
    Number::from_f64(parsed)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
