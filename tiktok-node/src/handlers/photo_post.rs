//! Photo post handlers.

use serde_json::{json, Value};

use super::compact;
use crate::traits::handler::Handler;
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::types::selector::Resource;
use crate::Error;

const RESOURCE: Resource = Resource::PhotoPost;

/// Single-photo post pulled from a URL. The only image is the cover.
pub struct Upload;

impl Handler for Upload {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let fields = item.fields();
        let photo_url = fields.required_string(RESOURCE.label(), "photoUrl", "Photo URL")?;
        let additional = fields.object("additionalFields");

        let post_info = compact(vec![
            ("title", additional.string("caption").map(Value::from)),
            ("description", additional.string("tags").map(Value::from)),
            ("privacy_level", additional.string("privacyLevel").map(Value::from)),
            (
                "schedule_time",
                additional.i64("scheduleTime").filter(|t| *t > 0).map(Value::from),
            ),
        ]);

        Ok(RequestDescriptor::post(
            "/v2/post/publish/content/init/",
            json!({
                "post_info": post_info,
                "source_info": {
                    "source": "PULL_FROM_URL",
                    "photo_cover_index": 0,
                    "photo_images": [photo_url],
                },
                "post_mode": "MEDIA_UPLOAD",
                "media_type": "PHOTO",
            }),
        ))
    }
}
