// 3rd party crates
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload accepted by the record API on create and update.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub ttl: u32,
    pub record_type: String,
    pub class: String,
}

impl RecordPayload {
    /// An `A` record in class `IN`.
    pub fn a(name: impl Into<String>, ip: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            ip: Some(ip.into()),
            value: None,
            ttl,
            record_type: "A".to_string(),
            class: "IN".to_string(),
        }
    }

    /// A value-carrying record (CNAME, TXT, ...) in class `IN`.
    pub fn with_value(
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            ip: None,
            value: Some(value.into()),
            ttl,
            record_type: record_type.into(),
            class: "IN".to_string(),
        }
    }
}

/// Success envelope wrapping every record API response body.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Extracts `data.id` as a string. Accepts non-empty strings and numbers.
    pub fn record_id(&self) -> Option<String> {
        if !self.success {
            return None;
        }

        match self.data.as_ref()?.get("id")? {
            Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}
