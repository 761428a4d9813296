use serde_json::json;

use crate::traits::handler::Handler;
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::types::selector::Resource;
use crate::Error;

/// Publish status of a post started through one of the upload handlers.
pub struct Get;

impl Handler for Get {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let publish_id =
            item.fields()
                .required_string(Resource::PostStatus.label(), "publishId", "Publish ID")?;
        Ok(RequestDescriptor::post(
            "/v2/post/publish/status/fetch/",
            json!({ "publish_id": publish_id }),
        ))
    }
}
