//! Common contract of every `(resource, operation)` handler.

use async_trait::async_trait;
use serde_json::Value;

use super::transport::Transport;
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::Error;

#[async_trait]
pub trait Handler: Send + Sync {
    /// Build the request for one item. Validation failures surface here, before any call.
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error>;

    /// Turn the response body into output records. Defaults to the `data` payload.
    fn normalize(&self, _item: &Item, response: Value) -> Result<Vec<Value>, Error> {
        Ok(records(data(response)))
    }

    /// Build, send once, normalize.
    async fn execute(&self, transport: &dyn Transport, item: &Item) -> Result<Vec<Value>, Error> {
        let request = self.build(item)?;
        let response = transport.send(request).await?;
        self.normalize(item, response)
    }
}

/// The `data` member of a TikTok response envelope, or the whole body when absent.
pub fn data(response: Value) -> Value {
    match response {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// One record per array element, or a single record for any other value.
pub fn records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        Value::Null => vec![Value::Object(Default::default())],
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_unwraps_envelope() {
        let body = json!({"data": {"publish_id": "p.1"}, "error": {"code": "ok"}});
        assert_eq!(data(body), json!({"publish_id": "p.1"}));
        assert_eq!(data(json!({"other": 1})), json!({"other": 1}));
    }

    #[test]
    fn test_records_flatten_arrays() {
        assert_eq!(records(json!([{"a": 1}, {"a": 2}])).len(), 2);
        assert_eq!(records(json!({"a": 1})), vec![json!({"a": 1})]);
        assert_eq!(records(Value::Null), vec![json!({})]);
    }
}
