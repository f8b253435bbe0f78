use nu_plugin::EvaluatedCall;
use nu_protocol::{LabeledError, PipelineData, Record, Span, Value};

use crate::algo::config::{self, Config};
use crate::error::SiteplanError;

/// Collect pipeline input as JSON rows.
///
/// Handles:
///   - Table (list of records) → one object per row
///   - Single record → [object]
///   - List of strings → [s1, s2, ...] (bare keyword terms)
///   - Empty/Nothing → []
pub fn input_rows(input: PipelineData) -> Vec<serde_json::Value> {
    match input {
        PipelineData::Value(Value::List { vals, .. }, _) => vals.iter().map(nu_to_json).collect(),
        PipelineData::Value(Value::Nothing { .. }, _) | PipelineData::Empty => Vec::new(),
        PipelineData::Value(value, _) => vec![nu_to_json(&value)],
        other => other.into_iter().map(|v| nu_to_json(&v)).collect(),
    }
}

/// Read pipeline input as a single string, if it is one.
pub fn input_text(input: &PipelineData) -> Option<String> {
    match input {
        PipelineData::Value(Value::String { val, .. }, _) => Some(val.clone()),
        _ => None,
    }
}

/// Convert a nu_protocol::Value to a serde_json::Value.
pub fn nu_to_json(val: &Value) -> serde_json::Value {
    match val {
        Value::Nothing { .. } => serde_json::Value::Null,
        Value::Bool { val, .. } => serde_json::Value::Bool(*val),
        Value::Int { val, .. } => serde_json::Value::from(*val),
        Value::Float { val, .. } => serde_json::Value::from(*val),
        Value::String { val, .. } => serde_json::Value::String(val.clone()),
        Value::List { vals, .. } => serde_json::Value::Array(vals.iter().map(nu_to_json).collect()),
        Value::Record { val, .. } => serde_json::Value::Object(
            val.iter()
                .map(|(k, v)| (k.clone(), nu_to_json(v)))
                .collect(),
        ),
        other => other
            .coerce_string()
            .map(serde_json::Value::String)
            .unwrap_or(serde_json::Value::Null),
    }
}

/// Convert a serde_json::Value to a nu_protocol::Value
pub fn json_to_nu(val: &serde_json::Value, span: Span) -> Value {
    match val {
        serde_json::Value::Null => Value::nothing(span),
        serde_json::Value::Bool(b) => Value::bool(*b, span),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::int(i, span)
            } else if let Some(f) = n.as_f64() {
                Value::float(f, span)
            } else {
                Value::string(n.to_string(), span)
            }
        }
        serde_json::Value::String(s) => Value::string(s, span),
        serde_json::Value::Array(arr) => {
            Value::list(arr.iter().map(|v| json_to_nu(v, span)).collect(), span)
        }
        serde_json::Value::Object(map) => {
            let mut record = Record::new();
            for (k, v) in map {
                record.push(k, json_to_nu(v, span));
            }
            Value::record(record, span)
        }
    }
}

/// Wrap a JSON result as pipeline output.
pub fn json_output(val: &serde_json::Value, span: Span) -> PipelineData {
    PipelineData::Value(json_to_nu(val, span), None)
}

pub fn labeled(e: SiteplanError, span: Span) -> LabeledError {
    let label = if e.is_validation() {
        "rejected before classification"
    } else {
        "siteplan error"
    };
    LabeledError::new(e.to_string()).with_label(label, span)
}

/// Config from `--config <path>`, else the default resolution chain.
pub fn call_config(call: &EvaluatedCall) -> Result<Config, LabeledError> {
    let path: Option<String> = call.get_flag("config")?;
    config::resolve_config(path.as_deref()).map_err(|e| labeled(e, call.head))
}
