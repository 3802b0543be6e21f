// src/notion/types.rs
// Notion wire types and error definitions

use std::collections::HashMap;

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the Notion API surface.
#[derive(Debug, Error)]
pub enum NotionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    #[error("authentication failed")]
    Authentication,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Body for `POST /pages`: create a page under a parent database.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePageRequest {
    pub parent: Parent,
    pub properties: HashMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parent {
    pub database_id: String,
}

/// Body for `PATCH /pages/{id}`: overwrite selected properties.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePageRequest {
    pub properties: HashMap<String, PropertyValue>,
}

/// One property payload, keyed in the request by its configured name.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    Text { rich_text: Vec<RichText> },
    Date { date: DateValue },
}

impl PropertyValue {
    pub fn title(content: impl Into<String>) -> Self {
        Self::Title {
            title: vec![RichText::text(content)],
        }
    }

    pub fn rich_text(content: impl Into<String>) -> Self {
        Self::Text {
            rich_text: vec![RichText::text(content)],
        }
    }

    /// A date property set to the local time of the call.
    pub fn date_now() -> Self {
        Self::Date {
            date: DateValue {
                start: Local::now().to_rfc3339(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DateValue {
    pub start: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: TextContent,
}

impl RichText {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_wire_shapes() {
        let title = serde_json::to_value(PropertyValue::title("run 1")).unwrap();
        assert_eq!(title["title"][0]["type"], "text");
        assert_eq!(title["title"][0]["text"]["content"], "run 1");

        let text = serde_json::to_value(PropertyValue::rich_text("▓▓░░ 50%")).unwrap();
        assert_eq!(text["rich_text"][0]["text"]["content"], "▓▓░░ 50%");

        let date = serde_json::to_value(PropertyValue::date_now()).unwrap();
        assert!(date["date"]["start"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_create_request_keys_properties_by_configured_name() {
        let mut properties = HashMap::new();
        properties.insert("Progress".to_string(), PropertyValue::rich_text("░ 0%"));

        let request = CreatePageRequest {
            parent: Parent {
                database_id: "db123".to_string(),
            },
            properties,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parent"]["database_id"], "db123");
        assert!(json["properties"].get("Progress").is_some());
    }
}
