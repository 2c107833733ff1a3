use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize;

const KNOWN: &[&str] = &[
    "id",
    "title",
    "name",
    "issuer",
    "issue_date",
    "date",
    "image_path",
    "image",
    "credential_id",
    "credentialId",
    "verification_link",
    "verificationLink",
    "published",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Certificate {
    pub id: i64,
    pub title: String,
    pub issuer: String,
    pub issue_date: String,
    pub image_path: String,
    pub credential_id: String,
    pub verification_link: String,
    pub published: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Certificate {
    pub fn from_value(raw: &Value) -> Self {
        Certificate {
            id: normalize::pick_id(raw),
            title: normalize::pick_str(raw, &["title", "name"]),
            issuer: normalize::pick_str(raw, &["issuer"]),
            issue_date: normalize::pick_str(raw, &["issue_date", "date"]),
            image_path: normalize::pick_str(raw, &["image_path", "image"]),
            credential_id: normalize::pick_str(raw, &["credential_id", "credentialId"]),
            verification_link: normalize::pick_str(raw, &["verification_link", "verificationLink"]),
            published: normalize::pick_published(raw),
            extra: normalize::passthrough(raw, KNOWN),
        }
    }
}
