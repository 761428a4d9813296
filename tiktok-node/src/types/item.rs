//! Input items and typed access to their fields.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::Error;

/// Binary payload attached to an item, e.g. a video file for upload.
#[derive(Clone, PartialEq)]
pub struct BinaryData {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl std::fmt::Debug for BinaryData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryData")
            .field("len", &self.data.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// One unit of work: the user's field values plus any attached binaries.
#[derive(Debug, Clone, Default)]
pub struct Item {
    pub json: Map<String, Value>,
    pub binary: HashMap<String, BinaryData>,
}

impl Item {
    pub fn new(json: Map<String, Value>) -> Self {
        Self {
            json,
            binary: HashMap::new(),
        }
    }

    pub fn with_binary(mut self, name: &str, data: BinaryData) -> Self {
        self.binary.insert(name.to_string(), data);
        self
    }

    pub fn fields(&self) -> Fields<'_> {
        Fields {
            map: Some(&self.json),
        }
    }

    /// Binary property `name`, or a configuration error naming the resource.
    pub fn required_binary(&self, resource: &str, name: &str) -> Result<&BinaryData, Error> {
        self.binary.get(name).ok_or_else(|| {
            Error::Configuration(format!(
                "{}: no binary data found in property \"{}\".",
                resource, name
            ))
        })
    }
}

/// Read-only view over a field map. Missing nested collections read as empty.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(name)).filter(|v| !v.is_null())
    }

    /// Nested collection such as `additionalFields` or `pagination`.
    pub fn object(&self, name: &str) -> Fields<'a> {
        Fields {
            map: self.get(name).and_then(Value::as_object),
        }
    }

    /// Non-empty string value. Numbers are accepted and rendered as strings.
    pub fn string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn required_string(&self, resource: &str, name: &str, label: &str) -> Result<String, Error> {
        self.string(name).ok_or_else(|| {
            Error::Configuration(format!("{}: \"{}\" is required.", resource, label))
        })
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Multi-select values. A comma-separated string is accepted as well as an array.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Required multi-select; an empty selection fails before any request is built.
    pub fn required_selection(
        &self,
        resource: &str,
        name: &str,
        label: &str,
    ) -> Result<Vec<String>, Error> {
        let values = self.list(name);
        if values.is_empty() {
            return Err(Error::Configuration(format!(
                "{}: \"{}\" must include at least one selection.",
                resource, label
            )));
        }
        Ok(values)
    }

    /// Raw value, for fields with a composite shape such as resource locators.
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => Item::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_strings_and_numbers() {
        let item = item(json!({"videoId": 7301, "publishId": " p.1 ", "empty": ""}));
        let fields = item.fields();

        assert_eq!(fields.string("videoId").as_deref(), Some("7301"));
        assert_eq!(fields.string("publishId").as_deref(), Some("p.1"));
        assert_eq!(fields.string("empty"), None);
        assert_eq!(fields.string("missing"), None);
    }

    #[test]
    fn test_required_string_message() {
        let err = Item::default()
            .fields()
            .required_string("Post Status", "publishId", "Publish ID")
            .unwrap_err();
        assert_eq!(err.to_string(), "Post Status: \"Publish ID\" is required.");
    }

    #[test]
    fn test_nested_object_missing_reads_empty() {
        let item = item(json!({"pagination": {"cursor": 5, "pageSize": "10"}}));
        let fields = item.fields();

        assert_eq!(fields.object("pagination").i64("cursor"), Some(5));
        assert_eq!(fields.object("pagination").i64("pageSize"), Some(10));
        assert_eq!(fields.object("additionalFields").string("title"), None);
    }

    #[test]
    fn test_list_accepts_array_or_csv() {
        let item = item(json!({"a": ["open_id", "", "username"], "b": "views, likes", "c": []}));
        let fields = item.fields();

        assert_eq!(fields.list("a"), vec!["open_id", "username"]);
        assert_eq!(fields.list("b"), vec!["views", "likes"]);
        assert!(fields.list("c").is_empty());
    }

    #[test]
    fn test_required_selection_message() {
        let item = item(json!({"fields": []}));
        let err = item
            .fields()
            .required_selection("User Profile", "fields", "Fields")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "User Profile: \"Fields\" must include at least one selection."
        );
    }

    #[test]
    fn test_required_binary() {
        let item = Item::default().with_binary(
            "data",
            BinaryData {
                data: vec![1, 2, 3],
                mime_type: "video/mp4".to_string(),
                file_name: None,
            },
        );

        assert_eq!(item.required_binary("Video Post", "data").unwrap().data.len(), 3);
        assert!(matches!(
            item.required_binary("Video Post", "video"),
            Err(Error::Configuration(_))
        ));
    }
}
