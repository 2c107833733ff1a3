use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize;

const KNOWN: &[&str] = &[
    "id",
    "caption",
    "event_date",
    "date",
    "image_path",
    "url",
    "image",
    "published",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryItem {
    pub id: i64,
    pub caption: String,
    pub event_date: String,
    pub image_path: String,
    pub published: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GalleryItem {
    pub fn from_value(raw: &Value) -> Self {
        GalleryItem {
            id: normalize::pick_id(raw),
            caption: normalize::pick_str(raw, &["caption"]),
            event_date: normalize::pick_str(raw, &["event_date", "date"]),
            image_path: normalize::pick_str(raw, &["image_path", "url", "image"]),
            published: normalize::pick_published(raw),
            extra: normalize::passthrough(raw, KNOWN),
        }
    }
}
