use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize;

/// Field names claimed by the canonical shape; everything else rides along
/// in `extra`.
const KNOWN: &[&str] = &[
    "id",
    "title",
    "description",
    "category",
    "platform",
    "difficulty",
    "status",
    "date_completed",
    "dateCompleted",
    "date",
    "tags",
    "categories",
    "medium_link",
    "mediumLink",
    "github_link",
    "githubLink",
    "live_link",
    "liveLink",
    "source_site",
    "sourceSite",
    "ctf_name",
    "ctfName",
    "hero_image",
    "thumbnail",
    "image",
    "badge_thumbnail",
    "badgeThumbnail",
    "screenshots",
    "attachments",
    "published",
];

/// One CTF/lab challenge entry, normalized from whichever JSON generation it
/// arrived in (hand-authored, legacy export, or API response).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub platform: String,
    pub difficulty: String,
    pub status: String,
    pub date_completed: String,
    pub tags: Vec<String>,
    pub medium_link: String,
    pub github_link: String,
    pub live_link: String,
    pub source_site: String,
    pub ctf_name: String,
    pub hero_image: String,
    pub badge_thumbnail: String,
    pub screenshots: Vec<String>,
    pub attachments: Vec<String>,
    pub published: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Challenge {
    /// Normalize one raw record. Never fails; missing fields default.
    pub fn from_value(raw: &Value) -> Self {
        let status = normalize::pick_str(raw, &["status"]);
        Challenge {
            id: normalize::pick_id(raw),
            title: normalize::pick_str(raw, &["title"]),
            description: normalize::pick_str(raw, &["description"]),
            category: normalize::canonical_category(&normalize::pick_str(raw, &["category"])),
            platform: normalize::canonical_platform(&normalize::pick_str(raw, &["platform"])),
            difficulty: normalize::pick_str(raw, &["difficulty"]),
            status: if status.is_empty() {
                "Completed".to_string()
            } else {
                status
            },
            date_completed: normalize::pick_str(raw, &["date_completed", "dateCompleted", "date"]),
            tags: normalize::pick_list(raw, &["tags", "categories"]),
            medium_link: normalize::pick_str(raw, &["medium_link", "mediumLink"]),
            github_link: normalize::pick_str(raw, &["github_link", "githubLink"]),
            live_link: normalize::pick_str(raw, &["live_link", "liveLink"]),
            source_site: normalize::pick_str(raw, &["source_site", "sourceSite"]),
            ctf_name: normalize::pick_str(raw, &["ctf_name", "ctfName"]),
            hero_image: normalize::pick_str(raw, &["hero_image", "thumbnail", "image"]),
            badge_thumbnail: normalize::pick_str(raw, &["badge_thumbnail", "badgeThumbnail"]),
            screenshots: normalize::pick_list(raw, &["screenshots"]),
            attachments: normalize::pick_list(raw, &["attachments"]),
            published: normalize::pick_published(raw),
            extra: normalize::passthrough(raw, KNOWN),
        }
    }

    /// The category-set a challenge belongs to for filtering: its category
    /// bucket plus every free-text tag.
    pub fn matches_category(&self, value: &str) -> bool {
        self.category == value || self.tags.iter().any(|t| t == value)
    }

    pub fn writeup_link(&self) -> Option<&str> {
        Some(self.medium_link.as_str()).filter(|u| normalize::is_safe_external_url(u))
    }

    pub fn source_link(&self) -> Option<&str> {
        Some(self.github_link.as_str()).filter(|u| normalize::is_safe_external_url(u))
    }

    pub fn demo_link(&self) -> Option<&str> {
        Some(self.live_link.as_str()).filter(|u| normalize::is_safe_external_url(u))
    }
}
