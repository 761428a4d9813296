//! Loading input items from a JSON document.
//!
//! The document is an array of `{ "json": {...}, "binary": { name: {...} } }` entries.
//! A binary is given either by `path` (relative paths resolve against the document's
//! directory) or inline as base64 `data`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::*;
use serde::Deserialize;
use serde_json::{Map, Value};

use tiktok_node::{BinaryData, Item};

use crate::error::Error;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct ItemEntry {
    #[serde(default)]
    json: Map<String, Value>,
    #[serde(default)]
    binary: HashMap<String, BinaryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinaryEntry {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
}

/// Read items from `path`.
pub async fn load_items(path: &Path) -> Result<Vec<Item>, Error> {
    let contents = tokio::fs::read_to_string(path).await?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_items(&contents, base_dir).await
}

/// Parse an items document. Binary paths resolve against `base_dir`.
pub async fn parse_items(contents: &str, base_dir: &Path) -> Result<Vec<Item>, Error> {
    let entries: Vec<ItemEntry> = serde_json::from_str(contents)?;
    let mut items = Vec::with_capacity(entries.len());

    for entry in entries {
        let mut item = Item::new(entry.json);
        for (name, binary) in entry.binary {
            let data = binary.load(base_dir).await?;
            trace!("Attached binary \"{}\" ({} bytes)", name, data.data.len());
            item = item.with_binary(&name, data);
        }
        items.push(item);
    }

    debug!("Loaded {} items", items.len());
    Ok(items)
}

impl BinaryEntry {
    async fn load(self, base_dir: &Path) -> Result<BinaryData, Error> {
        let (data, file_name, guessed) = match (self.path, self.data) {
            (Some(path), _) => {
                let path = if path.is_relative() { base_dir.join(path) } else { path };
                let bytes = tokio::fs::read(&path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                (bytes, file_name, mime_for(&path))
            }
            (None, Some(encoded)) => {
                let bytes = STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| Error::Config(format!("Invalid base64 binary data: {}", e)))?;
                (bytes, None, None)
            }
            (None, None) => {
                return Err(Error::Config(
                    "Binary entries need either \"path\" or \"data\"".to_string(),
                ))
            }
        };

        Ok(BinaryData {
            data,
            mime_type: self
                .mime_type
                .or(guessed)
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            file_name: self.file_name.or(file_name),
        })
    }
}

fn mime_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime.to_string())
}
