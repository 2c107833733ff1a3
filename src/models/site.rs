use serde::Serialize;
use serde_json::Value;

use crate::normalize;

/// Contact entry rendered as a link button on the public site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactLink {
    pub label: String,
    pub href: String,
}

/// Profile-badge descriptor for the TryHackMe integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TryHackMeProfile {
    #[serde(rename = "profileUrl")]
    pub profile_url: String,
    #[serde(rename = "badgeEmbed")]
    pub badge_embed: String,
}

/// Site-wide settings. Serialized field names stay camelCase to match the
/// external documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteSettings {
    #[serde(rename = "heroTitle")]
    pub hero_title: String,
    #[serde(rename = "heroSummary")]
    pub hero_summary: String,
    pub about: String,
    pub contact: Vec<ContactLink>,
    pub tryhackme: TryHackMeProfile,
}

impl SiteSettings {
    pub fn from_value(raw: &Value) -> Self {
        let contact = raw
            .get("contact")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|item| ContactLink {
                        label: normalize::pick_str(item, &["label"]),
                        href: normalize::pick_str(item, &["href", "url"]),
                    })
                    .filter(|c| !c.label.is_empty() || !c.href.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        // Both the flat draft ("tryhackme") and the settings API
        // ("tryhackme_profile") spellings are accepted.
        let thm_raw = raw
            .get("tryhackme")
            .or_else(|| raw.get("tryhackme_profile"))
            .cloned()
            .unwrap_or(Value::Null);

        SiteSettings {
            hero_title: normalize::pick_str(raw, &["heroTitle"]),
            hero_summary: normalize::pick_str(raw, &["heroSummary"]),
            about: normalize::pick_str(raw, &["about"]),
            contact,
            tryhackme: TryHackMeProfile {
                profile_url: normalize::pick_str(&thm_raw, &["profileUrl"]),
                badge_embed: normalize::pick_str(&thm_raw, &["badgeEmbed", "badgeImage"]),
            },
        }
    }
}
