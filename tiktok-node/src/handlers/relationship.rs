//! Follow and unfollow handlers.

use serde_json::Value;

use crate::traits::handler::Handler;
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::types::selector::Resource;
use crate::Error;

const RESOURCE: Resource = Resource::Relationship;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Follow,
    Unfollow,
}

/// Follow or unfollow a user given as a resource locator `{mode: id|username, value}`.
/// A plain string is taken as a user id.
pub struct Change {
    action: Action,
}

impl Change {
    pub fn new(action: Action) -> Self {
        Self { action }
    }
}

fn target(item: &Item) -> Result<(&'static str, String), Error> {
    let missing = || Error::Configuration(format!("{}: \"User\" is required.", RESOURCE.label()));

    match item.fields().value("userId") {
        Some(Value::Object(locator)) => {
            let value = locator
                .get("value")
                .and_then(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|v| !v.is_empty())
                .ok_or_else(missing)?;
            match locator.get("mode").and_then(Value::as_str).unwrap_or("id") {
                "id" => Ok(("user_id", value)),
                "username" => Ok(("username", value.trim_start_matches('@').to_string())),
                other => Err(Error::Configuration(format!(
                    "{}: unsupported user mode \"{}\".",
                    RESOURCE.label(),
                    other
                ))),
            }
        }
        _ => item
            .fields()
            .string("userId")
            .map(|id| ("user_id", id))
            .ok_or_else(missing),
    }
}

impl Handler for Change {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let path = match self.action {
            Action::Follow => "/v2/user/follow/",
            Action::Unfollow => "/v2/user/unfollow/",
        };
        let (key, value) = target(item)?;
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), Value::from(value));
        Ok(RequestDescriptor::post(path, Value::Object(body)))
    }
}
