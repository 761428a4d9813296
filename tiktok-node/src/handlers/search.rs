//! Hashtag and sound search handlers.

use serde_json::json;

use crate::traits::handler::Handler;
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::types::selector::Resource;
use crate::Error;

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Hashtag,
    Sound,
}

/// Hashtag or sound search.
pub struct Search {
    kind: Kind,
}

impl Search {
    pub fn new(kind: Kind) -> Self {
        Self { kind }
    }

    fn path(&self) -> &'static str {
        match self.kind {
            Kind::Hashtag => "/v2/hashtag/search/",
            Kind::Sound => "/v2/sound/search/",
        }
    }
}

impl Handler for Search {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let fields = item.fields();
        let query = fields.required_string(Resource::Search.label(), "query", "Query")?;

        Ok(RequestDescriptor::post(
            self.path(),
            json!({
                "query": query,
                "cursor": fields.i64("cursor").unwrap_or(0),
                "max_count": fields.i64("limit").unwrap_or(DEFAULT_LIMIT),
            }),
        ))
    }
}
