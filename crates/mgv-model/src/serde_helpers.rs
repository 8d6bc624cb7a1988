// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer, Serializer};

/// Descriptor timestamps arrive as strings or numbers; both compare as strings.
pub mod timestamp_string {
    use super::*;
    use serde_json::Value;

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "timestamp must be a string or number, got {other}"
            ))),
        }
    }
}
