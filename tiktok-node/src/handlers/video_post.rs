//! Video post handlers: upload, delete, get, analytics.

use async_trait::async_trait;
use log::*;
use serde_json::{json, Value};

use super::{compact, metric_fields, pick_metrics};
use crate::traits::handler::{data, records, Handler};
use crate::traits::transport::Transport;
use crate::types::item::Item;
use crate::types::request::RequestDescriptor;
use crate::types::selector::Resource;
use crate::Error;

const RESOURCE: Resource = Resource::VideoPost;

/// Fields requested from the video list and query endpoints.
const VIDEO_FIELDS: &str = "id,title,video_description,create_time,cover_image_url,share_url,\
duration,view_count,like_count,comment_count,share_count";

const STAT_FIELDS: [&str; 4] = ["view_count", "like_count", "comment_count", "share_count"];

const METRICS: [(&str, &str); 4] = [
    ("views", "view_count"),
    ("likes", "like_count"),
    ("comments", "comment_count"),
    ("shares", "share_count"),
];

const DEFAULT_BINARY_PROPERTY: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    FileUpload,
    PullFromUrl,
}

impl Source {
    fn from_item(item: &Item) -> Result<Self, Error> {
        match item.fields().string("source").as_deref() {
            None | Some("FILE_UPLOAD") => Ok(Source::FileUpload),
            Some("PULL_FROM_URL") => Ok(Source::PullFromUrl),
            Some(other) => Err(Error::Configuration(format!(
                "{}: unsupported source \"{}\".",
                RESOURCE.label(),
                other
            ))),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Source::FileUpload => "FILE_UPLOAD",
            Source::PullFromUrl => "PULL_FROM_URL",
        }
    }
}

fn binary_property(item: &Item) -> String {
    item.fields()
        .string("binaryPropertyName")
        .unwrap_or_else(|| DEFAULT_BINARY_PROPERTY.to_string())
}

/// Direct post of a video, either pulled by TikTok from a URL or pushed as a single chunk.
pub struct Upload;

#[async_trait]
impl Handler for Upload {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let fields = item.fields();
        let additional = fields.object("additionalFields");
        let source = Source::from_item(item)?;

        let post_info = compact(vec![
            ("title", additional.string("title").map(Value::from)),
            ("privacy_level", additional.string("privacyLevel").map(Value::from)),
            ("disable_comment", additional.bool("disableComment").map(Value::from)),
            ("disable_duet", additional.bool("disableDuet").map(Value::from)),
            ("disable_stitch", additional.bool("disableStitch").map(Value::from)),
            (
                "video_cover_timestamp_ms",
                additional.i64("videoCoverTimestampMs").map(Value::from),
            ),
        ]);

        let source_info = match source {
            Source::PullFromUrl => json!({
                "source": source.as_str(),
                "video_url": fields.required_string(RESOURCE.label(), "videoUrl", "Video URL")?,
            }),
            Source::FileUpload => {
                let size = item
                    .required_binary(RESOURCE.label(), &binary_property(item))?
                    .data
                    .len();
                json!({
                    "source": source.as_str(),
                    "video_size": size,
                    "chunk_size": size,
                    "total_chunk_count": 1,
                })
            }
        };

        Ok(RequestDescriptor::post(
            "/v2/post/publish/video/init/",
            json!({ "post_info": post_info, "source_info": source_info }),
        ))
    }

    async fn execute(&self, transport: &dyn Transport, item: &Item) -> Result<Vec<Value>, Error> {
        let request = self.build(item)?;
        let init = data(transport.send(request).await?);

        if Source::from_item(item)? == Source::FileUpload {
            let upload_url = init
                .get("upload_url")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    Error::Deserialization(format!(
                        "{}: init response has no upload_url: {}",
                        RESOURCE.label(),
                        init
                    ))
                })?;
            let binary = item.required_binary(RESOURCE.label(), &binary_property(item))?;
            transport.upload(upload_url, binary).await?;
        }

        debug!("Video post initialised");
        Ok(records(init))
    }
}

pub struct Delete;

impl Handler for Delete {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let video_id = item
            .fields()
            .required_string(RESOURCE.label(), "videoId", "Video ID")?;
        Ok(RequestDescriptor::post(
            "/v2/video/delete/",
            json!({ "video_id": video_id }),
        ))
    }
}

/// One video by id, or a page of the user's videos.
pub struct Get;

impl Handler for Get {
    fn build(&self, item: &Item) -> Result<RequestDescriptor, Error> {
        let fields = item.fields();

        let request = match fields.string("videoId") {
            Some(video_id) => RequestDescriptor::post(
                "/v2/video/query/",
                json!({ "filters": { "video_ids": [video_id] } }),
            ),
            None => {
                let pagination = fields.object("pagination");
                let mut body = serde_json::Map::new();
                if let Some(cursor) = pagination.i64("cursor").filter(|c| *c > 0) {
                    body.insert("cursor".to_string(), cursor.into());
                }
                if let Some(page_size) = pagination.i64("pageSize").filter(|s| *s > 0) {
                    body.insert("max_count".to_string(), page_size.into());
                }
                RequestDescriptor::post("/v2/video/list/", Value::Object(body))
            }
        };

        Ok(request.with_query("fields", VIDEO_FIELDS))
    }

    fn normalize(&self, _item: &Item, response: Value) -> Result<Vec<Value>, Error> {
        Ok(videos(data(response)).iter().map(summarize).collect())
    }
}

/// Per-video metrics.
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
        let metrics = Self::metrics(item)?;
        let video_id = item
            .fields()
            .required_string(RESOURCE.label(), "videoId", "Video ID")?;

        let api_fields: Vec<&str> = std::iter::once("id")
            .chain(metrics.iter().map(|(_, field)| *field))
            .collect();

        Ok(RequestDescriptor::post(
            "/v2/video/query/",
            json!({ "filters": { "video_ids": [video_id] } }),
        )
        .with_query("fields", api_fields.join(",")))
    }

    fn normalize(&self, item: &Item, response: Value) -> Result<Vec<Value>, Error> {
        let metrics = Self::metrics(item)?;
        Ok(videos(data(response))
            .iter()
            .map(|video| {
                let mut record = pick_metrics(video, &metrics);
                record.insert("videoId".to_string(), video_id(video));
                Value::Object(record)
            })
            .collect())
    }
}

/// The `videos` array of a list/query payload. A non-array `videos` value counts as one video.
fn videos(payload: Value) -> Vec<Value> {
    match payload {
        Value::Object(mut map) => match map.remove("videos") {
            Some(Value::Array(videos)) => videos,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other],
        },
        Value::Array(videos) => videos,
        _ => Vec::new(),
    }
}

fn first_of(video: &Value, keys: &[&str]) -> Value {
    keys.iter()
        .filter_map(|key| video.get(*key))
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null)
}

fn video_id(video: &Value) -> Value {
    first_of(video, &["id", "video_id"])
}

/// `{videoId, caption, status, stats}`.
fn summarize(video: &Value) -> Value {
    let stats = match video.get("stats") {
        Some(stats) if !stats.is_null() => stats.clone(),
        _ => {
            let counts: serde_json::Map<String, Value> = STAT_FIELDS
                .iter()
                .filter_map(|field| video.get(*field).map(|v| (field.to_string(), v.clone())))
                .collect();
            if counts.is_empty() {
                Value::Null
            } else {
                Value::Object(counts)
            }
        }
    };

    json!({
        "videoId": video_id(video),
        "caption": first_of(video, &["caption", "title", "video_description"]),
        "status": first_of(video, &["status", "video_status"]),
        "stats": stats,
    })
}
