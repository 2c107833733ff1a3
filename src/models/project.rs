use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize;

const KNOWN: &[&str] = &[
    "id",
    "title",
    "description",
    "technologies",
    "github_link",
    "github",
    "live_link",
    "demo",
    "image_path",
    "image",
    "published",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_link: String,
    pub live_link: String,
    pub image_path: String,
    pub published: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn from_value(raw: &Value) -> Self {
        Project {
            id: normalize::pick_id(raw),
            title: normalize::pick_str(raw, &["title"]),
            description: normalize::pick_str(raw, &["description"]),
            technologies: normalize::pick_list(raw, &["technologies"]),
            github_link: normalize::pick_str(raw, &["github_link", "github"]),
            live_link: normalize::pick_str(raw, &["live_link", "demo"]),
            image_path: normalize::pick_str(raw, &["image_path", "image"]),
            published: normalize::pick_published(raw),
            extra: normalize::passthrough(raw, KNOWN),
        }
    }

    pub fn source_link(&self) -> Option<&str> {
        Some(self.github_link.as_str()).filter(|u| normalize::is_safe_external_url(u))
    }

    pub fn demo_link(&self) -> Option<&str> {
        Some(self.live_link.as_str()).filter(|u| normalize::is_safe_external_url(u))
    }
}
