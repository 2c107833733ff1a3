use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize;

const KNOWN: &[&str] = &[
    "id",
    "title",
    "description",
    "publication_date",
    "date",
    "link",
    "published",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub publication_date: String,
    pub link: String,
    pub published: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResearchItem {
    pub fn from_value(raw: &Value) -> Self {
        ResearchItem {
            id: normalize::pick_id(raw),
            title: normalize::pick_str(raw, &["title"]),
            description: normalize::pick_str(raw, &["description"]),
            publication_date: normalize::pick_str(raw, &["publication_date", "date"]),
            link: normalize::pick_str(raw, &["link"]),
            published: normalize::pick_published(raw),
            extra: normalize::passthrough(raw, KNOWN),
        }
    }
}
