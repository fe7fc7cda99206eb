use serde::{Deserialize, Serialize};
use serde_json::Value;

// ===== PAGE PAYLOAD TYPES =====

/// Everything the backend sends with a page visit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub url: String,
    #[serde(default)]
    pub version: Option<String>,
    pub view: View,
}

impl Context {
    pub fn new(url: impl Into<String>, view: View) -> Self {
        Self {
            url: url.into(),
            version: None,
            view,
        }
    }

    /// Parse a page payload as sent by the backend.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// The property tree, or `None` when the payload carried none.
    pub fn properties(&self) -> Option<&Value> {
        self.view.properties()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub component: String,
    #[serde(default)]
    pub properties: Value,
    // Properties the backend will send in a follow-up request
    #[serde(default)]
    pub deferred: Vec<String>,
}

impl View {
    pub fn new(component: impl Into<String>, properties: Value) -> Self {
        Self {
            component: component.into(),
            properties,
            deferred: Vec::new(),
        }
    }

    pub fn properties(&self) -> Option<&Value> {
        match &self.properties {
            Value::Null => None,
            properties => Some(properties),
        }
    }

    pub fn properties_mut(&mut self) -> Option<&mut Value> {
        match &mut self.properties {
            Value::Null => None,
            properties => Some(properties),
        }
    }
}
