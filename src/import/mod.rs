use std::fs;
use std::path::Path;

use log::{info, warn};
use serde_json::Value;

use crate::models::{Certificate, Challenge, GalleryItem, Project, ResearchItem, SiteSettings};
use crate::normalize::canonical_category;
use crate::store::{Snapshot, StoreError};

/// Seed documents read from the data directory. Every file is optional; a
/// missing one just yields an empty collection.
const SITE_FILE: &str = "site.json";
const CHALLENGES_FILE: &str = "challenges.json";
const CERTIFICATES_FILE: &str = "certificates.json";
const PROJECTS_FILE: &str = "projects.json";
const RESEARCH_FILE: &str = "research.json";
const GALLERY_FILE: &str = "gallery.json";

/// Assemble a snapshot from the seed JSON documents in `dir`.
pub fn load_snapshot(dir: &Path) -> Result<Snapshot, StoreError> {
    let mut site = SiteSettings::from_value(&read_doc(dir, SITE_FILE)?.unwrap_or(Value::Null));

    let (challenges, tryhackme) = match read_doc(dir, CHALLENGES_FILE)? {
        Some(doc) => parse_challenges_doc(&doc),
        None => (Vec::new(), None),
    };
    // Older exports carried the TryHackMe badge descriptor inside the
    // challenges document rather than the site document.
    if site.tryhackme.profile_url.is_empty() {
        if let Some(raw) = tryhackme {
            site.tryhackme = SiteSettings::from_value(&serde_json::json!({ "tryhackme": raw }))
                .tryhackme;
        }
    }

    let snapshot = Snapshot {
        site,
        challenges,
        certificates: read_list(dir, CERTIFICATES_FILE, Certificate::from_value)?,
        projects: read_list(dir, PROJECTS_FILE, Project::from_value)?,
        research: read_list(dir, RESEARCH_FILE, ResearchItem::from_value)?,
        gallery: read_list(dir, GALLERY_FILE, GalleryItem::from_value)?,
    };
    info!(
        "Loaded seed content from {}: {} challenges, {} certificates, {} projects",
        dir.display(),
        snapshot.challenges.len(),
        snapshot.certificates.len(),
        snapshot.projects.len()
    );
    Ok(snapshot)
}

/// Parse a challenges document in any of its three shapes: a bare array, a
/// flat `{ "challenges": [...] }` object, or the nested
/// `{ "categories": { key: { label, description, entries } } }` export.
/// Returns the challenges plus the TryHackMe descriptor when the document
/// carried one.
pub fn parse_challenges_doc(doc: &Value) -> (Vec<Challenge>, Option<Value>) {
    if let Some(arr) = doc.as_array() {
        return (arr.iter().map(Challenge::from_value).collect(), None);
    }

    let tryhackme = doc.get("tryhackme").filter(|v| !v.is_null()).cloned();

    if let Some(arr) = doc.get("challenges").and_then(|v| v.as_array()) {
        return (arr.iter().map(Challenge::from_value).collect(), tryhackme);
    }

    let mut out = Vec::new();
    if let Some(groups) = doc.get("categories").and_then(|v| v.as_object()) {
        for (key, group) in groups {
            let entries = group
                .get("entries")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            // In the nested shape the group key is authoritative; entries
            // carry no category of their own.
            let bucket = canonical_category(key);
            for entry in &entries {
                let mut raw = entry.clone();
                if let Some(obj) = raw.as_object_mut() {
                    obj.insert("category".into(), Value::String(bucket.clone()));
                }
                out.push(Challenge::from_value(&raw));
            }
        }
    } else if !doc.is_null() {
        warn!("Unrecognized challenges document shape; importing nothing");
    }
    (out, tryhackme)
}

fn read_doc(dir: &Path, name: &str) -> Result<Option<Value>, StoreError> {
    let path = dir.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)
        .map_err(|e| StoreError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
    let doc = serde_json::from_str(&text)
        .map_err(|e| StoreError::Storage(format!("Invalid JSON in {}: {}", path.display(), e)))?;
    Ok(Some(doc))
}

fn read_list<T>(dir: &Path, name: &str, normalize: fn(&Value) -> T) -> Result<Vec<T>, StoreError> {
    let doc = match read_doc(dir, name)? {
        Some(d) => d,
        None => return Ok(Vec::new()),
    };
    // Simple collections accept either a bare array or `{ "items": [...] }`.
    let arr = doc
        .as_array()
        .cloned()
        .or_else(|| doc.get("items").and_then(|v| v.as_array()).cloned())
        .unwrap_or_default();
    Ok(arr.iter().map(normalize).collect())
}
