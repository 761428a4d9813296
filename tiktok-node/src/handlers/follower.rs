//! Follower and following list handlers.

use serde_json::{json, Map, Value};

use crate::traits::handler::Handler;
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Followers,
    Following,
}

/// One page of followers or followed accounts.
pub struct List {
    direction: Direction,
}

impl List {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl Handler for List {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let path = match self.direction {
            Direction::Followers => "/v2/user/followers/list/",
            Direction::Following => "/v2/user/following/list/",
        };

        let mut body = Map::new();
        if let Some(token) = item.fields().string("paginationToken") {
            body.insert("pagination_token".to_string(), json!(token));
        }
        Ok(RequestDescriptor::post(path, Value::Object(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_and_token() {
        let followers = List::new(Direction::Followers).build(&Item::default()).unwrap();
        assert_eq!(followers.path, "/v2/user/followers/list/");
        assert_eq!(followers.body, Some(json!({})));

        let mut fields = Map::new();
        fields.insert("paginationToken".to_string(), json!("next-page"));
        let following = List::new(Direction::Following)
            .build(&Item::new(fields))
            .unwrap();
        assert_eq!(following.path, "/v2/user/following/list/");
        assert_eq!(following.body, Some(json!({"pagination_token": "next-page"})));
    }
}
