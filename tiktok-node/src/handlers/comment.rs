//! Comment handlers.

use serde_json::{json, Value};

use crate::traits::handler::{data, Handler};
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::types::selector::Resource;
use crate::Error;

const RESOURCE: Resource = Resource::Comment;

fn video_id(item: &Item) -> Result<String, Error> {
    item.fields()
        .required_string(RESOURCE.label(), "videoId", "Video ID")
}

/// Comments of a video, one record per comment.
pub struct List;

impl Handler for List {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let mut body = json!({ "video_id": video_id(item)? });
        if let Some(cursor) = item.fields().string("cursor") {
            body["cursor"] = Value::from(cursor);
        }
        Ok(RequestDescriptor::post("/v2/video/comment/list/", body))
    }

    fn normalize(&self, _item: &Item, response: Value) -> Result<Vec<Value>, Error> {
        match data(response) {
            Value::Object(mut map) => match map.remove("comments") {
                Some(Value::Array(comments)) => Ok(comments),
                _ => Ok(Vec::new()),
            },
            Value::Array(comments) => Ok(comments),
            _ => Ok(Vec::new()),
        }
    }
}

pub struct Create;

impl Handler for Create {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let text = item
            .fields()
            .required_string(RESOURCE.label(), "commentText", "Comment Text")?;
        Ok(RequestDescriptor::post(
            "/v2/video/comment/create/",
            json!({ "video_id": video_id(item)?, "text": text }),
        ))
    }
}

pub struct Delete;

impl Handler for Delete {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let comment_id = item
            .fields()
            .required_string(RESOURCE.label(), "commentId", "Comment ID")?;
        Ok(RequestDescriptor::post(
            "/v2/video/comment/delete/",
            json!({ "video_id": video_id(item)?, "comment_id": comment_id }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => Item::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_list_body_and_flattening() {
        let request = List
            .build(&item(json!({"videoId": "v1", "cursor": "c9"})))
            .unwrap();
        assert_eq!(request.body, Some(json!({"video_id": "v1", "cursor": "c9"})));

        let without_cursor = List.build(&item(json!({"videoId": "v1"}))).unwrap();
        assert_eq!(without_cursor.body, Some(json!({"video_id": "v1"})));

        let records = List
            .normalize(
                &Item::default(),
                json!({"data": {"comments": [{"id": "c1"}, {"id": "c2"}], "has_more": false}}),
            )
            .unwrap();
        assert_eq!(records, vec![json!({"id": "c1"}), json!({"id": "c2"})]);
    }

    #[test]
    fn test_create_and_delete_bodies() {
        let create = Create
            .build(&item(json!({"videoId": "v1", "commentText": "nice"})))
            .unwrap();
        assert_eq!(create.path, "/v2/video/comment/create/");
        assert_eq!(create.body, Some(json!({"video_id": "v1", "text": "nice"})));

        let delete = Delete
            .build(&item(json!({"videoId": "v1", "commentId": "c1"})))
            .unwrap();
        assert_eq!(delete.body, Some(json!({"video_id": "v1", "comment_id": "c1"})));

        let err = Create.build(&item(json!({"videoId": "v1"}))).unwrap_err();
        assert_eq!(err.to_string(), "Comment: \"Comment Text\" is required.");
    }
}
