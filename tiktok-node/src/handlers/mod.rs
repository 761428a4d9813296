//! Handlers for every supported `(resource, operation)` pair.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::traits::handler::Handler;
use crate::types::selector::{Operation, Resource};
use crate::Error;

pub mod comment;
pub mod follower;
pub mod photo_post;
pub mod post_status;
pub mod relationship;
pub mod search;
pub mod user_profile;
pub mod video_post;

pub type Registry = HashMap<(Resource, Operation), Box<dyn Handler>>;

/// All handlers keyed by their selector.
pub fn registry() -> Registry {
    let mut handlers: Registry = HashMap::new();

    handlers.insert((Resource::VideoPost, Operation::Upload), Box::new(video_post::Upload));
    handlers.insert((Resource::VideoPost, Operation::Delete), Box::new(video_post::Delete));
    handlers.insert((Resource::VideoPost, Operation::Get), Box::new(video_post::Get));
    handlers.insert((Resource::VideoPost, Operation::Analytics), Box::new(video_post::Analytics));
    handlers.insert((Resource::PhotoPost, Operation::Upload), Box::new(photo_post::Upload));
    handlers.insert((Resource::UserProfile, Operation::Get), Box::new(user_profile::Get));
    handlers.insert(
        (Resource::UserProfile, Operation::Analytics),
        Box::new(user_profile::Analytics),
    );
    handlers.insert((Resource::PostStatus, Operation::Get), Box::new(post_status::Get));
    handlers.insert(
        (Resource::Search, Operation::Hashtag),
        Box::new(search::Search::new(search::Kind::Hashtag)),
    );
    handlers.insert(
        (Resource::Search, Operation::Sound),
        Box::new(search::Search::new(search::Kind::Sound)),
    );
    handlers.insert((Resource::Comment, Operation::List), Box::new(comment::List));
    handlers.insert((Resource::Comment, Operation::Create), Box::new(comment::Create));
    handlers.insert((Resource::Comment, Operation::Delete), Box::new(comment::Delete));
    handlers.insert(
        (Resource::Follower, Operation::ListFollowers),
        Box::new(follower::List::new(follower::Direction::Followers)),
    );
    handlers.insert(
        (Resource::Follower, Operation::ListFollowing),
        Box::new(follower::List::new(follower::Direction::Following)),
    );
    handlers.insert(
        (Resource::Relationship, Operation::Follow),
        Box::new(relationship::Change::new(relationship::Action::Follow)),
    );
    handlers.insert(
        (Resource::Relationship, Operation::Unfollow),
        Box::new(relationship::Change::new(relationship::Action::Unfollow)),
    );

    handlers
}

/// Resolve selected metric names to API field names through `table`.
fn metric_fields(
    resource: Resource,
    metrics: Vec<String>,
    table: &[(&str, &'static str)],
) -> Result<Vec<(String, &'static str)>, Error> {
    metrics
        .into_iter()
        .map(|metric| {
            table
                .iter()
                .find(|(name, _)| *name == metric)
                .map(|(_, field)| (metric.clone(), *field))
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "{}: unknown metric \"{}\".",
                        resource.label(),
                        metric
                    ))
                })
        })
        .collect()
}

/// `{<metric>: source[<api field>]}` for every selected metric.
fn pick_metrics(source: &Value, metrics: &[(String, &'static str)]) -> Map<String, Value> {
    metrics
        .iter()
        .map(|(metric, field)| {
            (
                metric.clone(),
                source.get(*field).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

/// Map of the entries that have a value.
fn compact(entries: Vec<(&str, Option<Value>)>) -> Map<String, Value> {
    entries
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}
