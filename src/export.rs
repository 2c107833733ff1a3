use std::fs;
use std::path::Path;

use log::info;
use serde_json::{json, Map, Value};

use crate::models::{Certificate, Challenge, GalleryItem, Project, ResearchItem, SiteSettings};
use crate::normalize::{CATEGORIES, DEFAULT_CATEGORY};
use crate::store::{Snapshot, StoreError};

/// Category-nested challenges document consumed by the public site. Every
/// known category key is always present, even when empty, so the renderer
/// never has to guard against a missing group.
pub fn nested_challenges_doc(site: &SiteSettings, challenges: &[Challenge]) -> Value {
    let mut groups = Map::new();
    for (key, label, description) in CATEGORIES {
        groups.insert(
            (*key).to_string(),
            json!({
                "label": label,
                "description": description,
                "entries": Value::Array(Vec::new()),
            }),
        );
    }

    for challenge in challenges {
        let bucket = if groups.contains_key(&challenge.category) {
            challenge.category.clone()
        } else if challenge.category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            // Ad-hoc categories get their own group so a re-import sees the
            // same bucket.
            groups.insert(
                challenge.category.clone(),
                json!({
                    "label": challenge.category,
                    "description": "",
                    "entries": Value::Array(Vec::new()),
                }),
            );
            challenge.category.clone()
        };
        if let Some(entries) = groups
            .get_mut(&bucket)
            .and_then(|g| g.get_mut("entries"))
            .and_then(|e| e.as_array_mut())
        {
            entries.push(nested_entry(challenge));
        }
    }

    json!({
        "tryhackme": tryhackme_value(site),
        "categories": Value::Object(groups),
    })
}

/// One entry in the nested document, in the legacy camelCase spelling. The
/// category is implied by the group key and not repeated here.
fn nested_entry(challenge: &Challenge) -> Value {
    let mut entry = challenge.extra.clone();
    entry.insert("id".into(), json!(challenge.id));
    entry.insert("title".into(), json!(challenge.title));
    entry.insert("description".into(), json!(challenge.description));
    entry.insert("platform".into(), json!(challenge.platform));
    entry.insert("difficulty".into(), json!(challenge.difficulty));
    entry.insert("status".into(), json!(challenge.status));
    entry.insert("dateCompleted".into(), json!(challenge.date_completed));
    entry.insert("tags".into(), json!(challenge.tags));
    entry.insert("mediumLink".into(), json!(challenge.medium_link));
    entry.insert("githubLink".into(), json!(challenge.github_link));
    entry.insert("liveLink".into(), json!(challenge.live_link));
    entry.insert("sourceSite".into(), json!(challenge.source_site));
    entry.insert("ctfName".into(), json!(challenge.ctf_name));
    entry.insert("image".into(), json!(challenge.hero_image));
    entry.insert("badgeThumbnail".into(), json!(challenge.badge_thumbnail));
    entry.insert("screenshots".into(), json!(challenge.screenshots));
    entry.insert("attachments".into(), json!(challenge.attachments));
    entry.insert("published".into(), json!(challenge.published));
    Value::Object(entry)
}

/// Flat draft document, as downloaded from the static admin: canonical
/// snake_case entries under one `challenges` array.
pub fn flat_challenges_doc(site: &SiteSettings, challenges: &[Challenge]) -> Value {
    let entries: Vec<Value> = challenges
        .iter()
        .map(|c| serde_json::to_value(c).unwrap_or(Value::Null))
        .collect();
    json!({
        "tryhackme": tryhackme_value(site),
        "challenges": entries,
    })
}

fn tryhackme_value(site: &SiteSettings) -> Value {
    if site.tryhackme.profile_url.is_empty() && site.tryhackme.badge_embed.is_empty() {
        Value::Null
    } else {
        json!(site.tryhackme)
    }
}

// ── Legacy per-type documents (public site) ─────────────────────────

pub fn certificates_doc(items: &[Certificate]) -> Value {
    Value::Array(
        items
            .iter()
            .filter(|c| c.published)
            .map(|c| {
                json!({
                    "name": c.title,
                    "issuer": c.issuer,
                    "date": c.issue_date,
                    "image": c.image_path,
                    "credentialId": c.credential_id,
                    "verificationLink": c.verification_link,
                })
            })
            .collect(),
    )
}

pub fn projects_doc(items: &[Project]) -> Value {
    Value::Array(
        items
            .iter()
            .filter(|p| p.published)
            .map(|p| {
                json!({
                    "title": p.title,
                    "description": p.description,
                    "technologies": p.technologies,
                    "github": p.github_link,
                    "demo": p.live_link,
                    "image": p.image_path,
                })
            })
            .collect(),
    )
}

pub fn research_doc(items: &[ResearchItem]) -> Value {
    Value::Array(
        items
            .iter()
            .filter(|r| r.published)
            .map(|r| {
                json!({
                    "title": r.title,
                    "description": r.description,
                    "link": r.link,
                    "date": r.publication_date,
                })
            })
            .collect(),
    )
}

pub fn gallery_doc(items: &[GalleryItem]) -> Value {
    Value::Array(
        items
            .iter()
            .filter(|g| g.published)
            .map(|g| {
                json!({
                    "url": g.image_path,
                    "caption": g.caption,
                    "date": g.event_date,
                })
            })
            .collect(),
    )
}

pub fn site_doc(site: &SiteSettings) -> Value {
    json!({
        "heroTitle": site.hero_title,
        "heroSummary": site.hero_summary,
        "about": site.about,
        "contact": site.contact,
    })
}

/// Write the full download bundle: one document per content type, plus the
/// flat draft document.
pub fn write_bundle(snapshot: &Snapshot, dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir)
        .map_err(|e| StoreError::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;

    let docs: &[(&str, Value)] = &[
        ("site.json", site_doc(&snapshot.site)),
        (
            "challenges.json",
            nested_challenges_doc(&snapshot.site, &snapshot.challenges),
        ),
        (
            "draft.json",
            flat_challenges_doc(&snapshot.site, &snapshot.challenges),
        ),
        ("certificates.json", certificates_doc(&snapshot.certificates)),
        ("projects.json", projects_doc(&snapshot.projects)),
        ("research.json", research_doc(&snapshot.research)),
        ("gallery.json", gallery_doc(&snapshot.gallery)),
    ];

    for (name, doc) in docs {
        let path = dir.join(name);
        let text = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        fs::write(&path, text)
            .map_err(|e| StoreError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;
    }
    info!("Wrote export bundle to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parse_challenges_doc;

    fn sample_challenges() -> Vec<Challenge> {
        [
            json!({ "id": 1, "title": "Blue", "category": "tryhackme", "published": true }),
            json!({ "id": 2, "title": "Lame", "category": "hackthebox", "published": false }),
            json!({ "id": 3, "title": "Speedrun", "category": "defcon-quals" }),
        ]
        .iter()
        .map(Challenge::from_value)
        .collect()
    }

    #[test]
    fn test_nested_doc_always_has_all_known_groups() {
        let doc = nested_challenges_doc(&SiteSettings::default(), &[]);
        let groups = doc["categories"].as_object().unwrap();
        for (key, label, _) in CATEGORIES {
            let group = &groups[*key];
            assert_eq!(group["label"], json!(label));
            assert_eq!(group["entries"], json!([]));
        }
    }

    #[test]
    fn test_nested_entries_use_legacy_names() {
        let challenges = vec![Challenge::from_value(&json!({
            "id": 1,
            "title": "Blue",
            "category": "tryhackme",
            "date_completed": "2023-05-01",
            "medium_link": "https://medium.com/@me/blue",
            "hero_image": "assets/blue.png",
        }))];
        let doc = nested_challenges_doc(&SiteSettings::default(), &challenges);
        let entry = &doc["categories"]["tryhackme"]["entries"][0];
        assert_eq!(entry["dateCompleted"], json!("2023-05-01"));
        assert_eq!(entry["mediumLink"], json!("https://medium.com/@me/blue"));
        assert_eq!(entry["image"], json!("assets/blue.png"));
        assert!(entry.get("date_completed").is_none());
    }

    #[test]
    fn test_nested_round_trip_preserves_ids_flags_and_categories() {
        let before = sample_challenges();
        let doc = nested_challenges_doc(&SiteSettings::default(), &before);
        let (after, _) = parse_challenges_doc(&doc);
        assert_eq!(after.len(), before.len());
        for original in &before {
            let restored = after.iter().find(|c| c.id == original.id).unwrap();
            assert_eq!(restored.published, original.published);
            assert_eq!(restored.category, original.category);
            assert_eq!(restored.title, original.title);
        }
    }

    #[test]
    fn test_flat_doc_round_trips_through_importer() {
        let before = sample_challenges();
        let doc = flat_challenges_doc(&SiteSettings::default(), &before);
        let (after, _) = parse_challenges_doc(&doc);
        assert_eq!(after, before);
    }

    #[test]
    fn test_legacy_docs_only_carry_published_items() {
        let certificates = vec![
            Certificate::from_value(&json!({ "id": 1, "name": "OSCP", "published": true })),
            Certificate::from_value(&json!({ "id": 2, "name": "Draft", "published": false })),
        ];
        let doc = certificates_doc(&certificates);
        let arr = doc.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["name"], json!("OSCP"));
    }

    #[test]
    fn test_site_doc_uses_camel_case() {
        let site = SiteSettings::from_value(&json!({
            "heroTitle": "Hi",
            "heroSummary": "Security notes",
        }));
        let doc = site_doc(&site);
        assert_eq!(doc["heroTitle"], json!("Hi"));
        assert_eq!(doc["heroSummary"], json!("Security notes"));
    }

    #[test]
    fn test_write_bundle_creates_all_documents() {
        let dir = std::env::temp_dir().join(format!("folioctl-export-{}", std::process::id()));
        let snapshot = Snapshot {
            challenges: sample_challenges(),
            ..Snapshot::default()
        };
        write_bundle(&snapshot, &dir).unwrap();
        for name in [
            "site.json",
            "challenges.json",
            "draft.json",
            "certificates.json",
            "projects.json",
            "research.json",
            "gallery.json",
        ] {
            assert!(dir.join(name).exists(), "missing {}", name);
        }
        std::fs::remove_dir_all(&dir).ok();
    }
}
