//! User profile handlers.

use serde_json::Value;

use super::{metric_fields, pick_metrics};
use crate::traits::handler::{data, Handler};
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::types::selector::Resource;
use crate::Error;

const RESOURCE: Resource = Resource::UserProfile;

const METRICS: [(&str, &str); 4] = [
    ("followerCount", "follower_count"),
    ("followingCount", "following_count"),
    ("likesCount", "likes_count"),
    ("videoCount", "video_count"),
];

fn user(response: Value) -> Value {
    match data(response) {
        Value::Object(mut map) => map.remove("user").unwrap_or(Value::Object(map)),
        other => other,
    }
}

/// Selected profile fields of the authorized user.
pub struct Get;

impl Handler for Get {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let fields = item
            .fields()
            .required_selection(RESOURCE.label(), "fields", "Fields")?;
        Ok(RequestDescriptor::get("/v2/user/info/").with_query("fields", fields.join(",")))
    }

    fn normalize(&self, _item: &Item, response: Value) -> Result<Vec<Value>, Error> {
        Ok(vec![user(response)])
    }
}

/// Account-level counters keyed by metric name.
pub struct Analytics;

impl Analytics {
    fn metrics(item: &Item) -> Result<Vec<(String, &'static str)>, Error> {
        let metrics = item
            .fields()
            .required_selection(RESOURCE.label(), "metrics", "Metrics")?;
        metric_fields(RESOURCE, metrics, &METRICS)
    }
}

impl Handler for Analytics {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let api_fields: Vec<&str> = Self::metrics(item)?
            .into_iter()
            .map(|(_, field)| field)
            .collect();
        Ok(RequestDescriptor::get("/v2/user/info/").with_query("fields", api_fields.join(",")))
    }

    fn normalize(&self, item: &Item, response: Value) -> Result<Vec<Value>, Error> {
        let metrics = Self::metrics(item)?;
        Ok(vec![Value::Object(pick_metrics(&user(response), &metrics))])
    }
}
