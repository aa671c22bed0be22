//! Model reply parsing: raw text → [`ExtractionResult`].
//!
//! The reply must be exactly one JSON object (surrounding whitespace is
//! fine, anything else is not). Inside that object the fields are decoded
//! leniently, because models are sloppy about types: a missing or `null`
//! field falls back to its default instead of failing the whole reply.
//!
//! | Field | Accepted | Default |
//! |-------|----------|---------|
//! | `isCertificate` | bool, number (non-zero = true), `"true"`/`"false"` | `false` |
//! | `confidence` | number, numeric string | `0.0` |
//! | `company`, `candidate` | string, number, bool | `""` |

use crate::error::CertVerifyError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Typed view of the model's JSON reply. Lives only inside one pipeline call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "isCertificate", default, deserialize_with = "lenient_bool")]
    pub is_certificate: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub candidate: String,
}

/// Parse the reply text as a single JSON object and coerce its fields.
///
/// Any parse failure, trailing content, or non-object top level yields
/// [`CertVerifyError::MalformedModelReply`]. The raw text is kept in the
/// error for server-side logs only.
pub fn parse_reply(raw: &str) -> Result<ExtractionResult, CertVerifyError> {
    let malformed = |reason: String| {
        warn!("Malformed model reply ({}): {:?}", reason, raw);
        CertVerifyError::MalformedModelReply {
            reason,
            raw: raw.to_string(),
        }
    };

    let value: Value = serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed(format!(
            "top-level value is {}, expected an object",
            json_type_name(&value)
        )));
    }

    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}
