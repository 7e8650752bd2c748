//! Response envelope returned by the order/activity query backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// State code the backend uses for a successful query.
pub const STATE_OK: i64 = 0;

/// Raw backend response: `{data, attrs, state, message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryEnvelope {
    #[serde(default)]
    pub data: Value,
    #[serde(default, alias = "attrs")]
    pub attributes: Value,
    #[serde(default)]
    pub state: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One entry of the activity list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub id: String,
    pub name: String,
}

impl QueryEnvelope {
    /// Convenience constructor for a successful status response.
    pub fn with_status(status: &str) -> Self {
        Self {
            data: serde_json::json!({ "status": status }),
            state: Some(STATE_OK),
            ..Self::default()
        }
    }

    /// The status string of an order or activity status query.
    pub fn status(&self) -> Option<&str> {
        self.data.get("status").and_then(Value::as_str)
    }

    /// Parses the activity list, accepting either a bare array or `{activities: [...]}`.
    ///
    /// Returns `None` when the payload is not a list. Entries without a name
    /// are skipped; numeric ids are rendered as strings.
    pub fn activities(&self) -> Option<Vec<ActivityRef>> {
        let items = match &self.data {
            Value::Array(items) => items,
            Value::Object(map) => map.get("activities")?.as_array()?,
            _ => return None,
        };

        let parsed = items
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?.trim();
                if name.is_empty() {
                    return None;
                }
                let id = match item.get("id") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => name.to_string(),
                };
                Some(ActivityRef {
                    id,
                    name: name.to_string(),
                })
            })
            .collect();
        Some(parsed)
    }
}

/// Failures reaching or decoding the query backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("query timed out")]
    Timeout,

    #[error("backend returned HTTP {status}")]
    Rejected { status: u16 },

    #[error("could not decode backend response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_attrs_alias() {
        let env: QueryEnvelope = serde_json::from_value(json!({
            "data": {"status": "success"},
            "attrs": {"orderNo": "1"},
            "state": 0,
            "message": "ok"
        }))
        .unwrap();
        assert_eq!(env.status(), Some("success"));
        assert_eq!(env.attributes["orderNo"], "1");
        assert_eq!(env.state, Some(0));
    }

    #[test]
    fn missing_state_deserializes_as_none() {
        let env: QueryEnvelope = serde_json::from_value(json!({"data": {}})).unwrap();
        assert_eq!(env.state, None);
        assert_eq!(env.status(), None);
    }

    #[test]
    fn activities_accepts_bare_and_wrapped_lists() {
        let bare = QueryEnvelope {
            data: json!([{"id": 7, "name": "Weekly Rebate"}]),
            ..Default::default()
        };
        let wrapped = QueryEnvelope {
            data: json!({"activities": [{"id": "a1", "name": "First Deposit Bonus"}, {"id": "x"}]}),
            ..Default::default()
        };

        let bare = bare.activities().unwrap();
        assert_eq!(bare[0].id, "7");

        let wrapped = wrapped.activities().unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].name, "First Deposit Bonus");
    }

    #[test]
    fn activities_is_none_for_non_list_payload() {
        let env = QueryEnvelope::with_status("paid");
        assert_eq!(env.activities(), None);
    }
}
