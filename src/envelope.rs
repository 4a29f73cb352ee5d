//! The result envelope: one query execution's outcome as an open JSON mapping.
//!
//! Backends return whatever payload they have (rows, plans, error dumps). The
//! suite then merges its decorations (`generator`, `valueRange`, `sigma`,
//! `query`) and the controller and result log merge theirs on top. Keeping the
//! envelope an extensible map is what makes that layering possible; downstream
//! consumers must treat records the same way.

use serde::Serialize;
use serde_json::{Map, Value};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_TIMEOUT: &str = "timeout";

/// One query execution outcome. A thin wrapper over a JSON object.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    pub fn new() -> Self {
        Envelope(Map::new())
    }

    /// Build an envelope from an arbitrary backend response body. Non-object
    /// bodies are wrapped so the status contract still holds.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Envelope(map),
            other => {
                let mut env = Envelope::new();
                env.set("status", "error");
                env.set("body", other);
                env
            }
        }
    }

    pub fn success() -> Self {
        let mut env = Envelope::new();
        env.set("status", STATUS_SUCCESS);
        env
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        let mut env = Envelope::new();
        env.set("status", STATUS_TIMEOUT);
        env.set("error", detail.into());
        env
    }

    pub fn error_status(detail: impl Into<String>) -> Self {
        let mut env = Envelope::new();
        env.set("status", "error");
        env.set("error", detail.into());
        env
    }

    /// The backend-reported status, or "unknown" when the backend returned
    /// something without one.
    pub fn status(&self) -> &str {
        self.0
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    pub fn is_success(&self) -> bool {
        self.status() == STATUS_SUCCESS
    }

    /// Insert or overwrite a field.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn set_if_absent(&mut self, key: &str, value: impl Into<Value>) {
        if !self.0.contains_key(key) {
            self.0.insert(key.to_string(), value.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Envelope {
    fn from(map: Map<String, Value>) -> Self {
        Envelope(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_defaults_to_unknown() {
        let env = Envelope::new();
        assert_eq!(env.status(), "unknown");
        assert!(!env.is_success());
    }

    #[test]
    fn set_overwrites_existing_field() {
        let mut env = Envelope::success();
        env.set("query", "placeholder");
        env.set("query", "12");
        assert_eq!(env.get("query"), Some(&json!("12")));
    }

    #[test]
    fn set_if_absent_keeps_existing_field() {
        let mut env = Envelope::new();
        env.set("clientTime", 1.5);
        env.set_if_absent("clientTime", 9.0);
        assert_eq!(env.get("clientTime"), Some(&json!(1.5)));
    }

    #[test]
    fn non_object_body_is_wrapped_as_error() {
        let env = Envelope::from_value(json!([1, 2, 3]));
        assert_eq!(env.status(), "error");
        assert_eq!(env.get("body"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn serializes_transparently() {
        let mut env = Envelope::success();
        env.set("sigma", 10.0);
        let text = serde_json::to_string(&env).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["sigma"], 10.0);
    }
}
