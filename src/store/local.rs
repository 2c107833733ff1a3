use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::info;
use serde_json::Value;

use crate::models::{Certificate, Challenge, GalleryItem, Project, ResearchItem, SiteSettings};
use crate::store::{ChallengeFilter, ContentStore, Page, Snapshot, StoreError};

/// Authoritative in-memory store. Every mutation synchronously rewrites the
/// whole draft blob: one JSON document, last writer wins, no versioning.
pub struct LocalStore {
    state: Mutex<Snapshot>,
    draft_path: Option<PathBuf>,
}

impl LocalStore {
    pub fn new(snapshot: Snapshot, draft_path: PathBuf) -> Self {
        LocalStore {
            state: Mutex::new(snapshot),
            draft_path: Some(draft_path),
        }
    }

    /// Store without a backing file. Used by tests and dry runs.
    pub fn in_memory(snapshot: Snapshot) -> Self {
        LocalStore {
            state: Mutex::new(snapshot),
            draft_path: None,
        }
    }

    /// Load the draft blob from disk, re-normalizing every record.
    pub fn load(draft_path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(draft_path)
            .map_err(|e| StoreError::Storage(format!("read {}: {}", draft_path.display(), e)))?;
        let raw: Value = serde_json::from_str(&text)
            .map_err(|e| StoreError::Storage(format!("parse {}: {}", draft_path.display(), e)))?;
        info!("Loaded draft blob from {}", draft_path.display());
        Ok(Self::new(Snapshot::from_value(&raw), draft_path.to_path_buf()))
    }

    fn state(&self) -> Result<MutexGuard<'_, Snapshot>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Storage("state lock poisoned".into()))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let path = match &self.draft_path {
            Some(p) => p,
            None => return Ok(()),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        fs::write(path, text)
            .map_err(|e| StoreError::Storage(format!("write {}: {}", path.display(), e)))
    }
}

// ── Generic collection edits ────────────────────────────────────────

fn upsert_by_id<T: Clone>(items: &mut Vec<T>, item: T, id_of: fn(&T) -> i64) -> T {
    let id = id_of(&item);
    match items.iter_mut().find(|x| id_of(x) == id) {
        // Replace in place so list position survives an edit.
        Some(slot) => *slot = item.clone(),
        None => items.push(item.clone()),
    }
    item
}

fn delete_by_id<T>(items: &mut Vec<T>, id: i64, id_of: fn(&T) -> i64) {
    items.retain(|x| id_of(x) != id);
}

fn toggle_by_id<T: Clone>(
    items: &mut [T],
    id: i64,
    id_of: fn(&T) -> i64,
    flip: fn(&mut T),
) -> Option<T> {
    let item = items.iter_mut().find(|x| id_of(x) == id)?;
    flip(item);
    Some(item.clone())
}

impl ContentStore for LocalStore {
    fn mode(&self) -> &'static str {
        "local"
    }

    // ── Challenges ──────────────────────────────────────────────────

    fn challenge_list(
        &self,
        filter: &ChallengeFilter,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Challenge>, StoreError> {
        let state = self.state()?;
        // Insertion order is the stable listing order in local mode.
        let filtered: Vec<Challenge> = state
            .challenges
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Ok(super::paginate(&filtered, page, page_size))
    }

    fn challenge_upsert(&self, raw: &Value) -> Result<Challenge, StoreError> {
        let mut state = self.state()?;
        let item = upsert_by_id(&mut state.challenges, Challenge::from_value(raw), |c| c.id);
        self.persist(&state)?;
        Ok(item)
    }

    fn challenge_delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state()?;
        delete_by_id(&mut state.challenges, id, |c| c.id);
        self.persist(&state)
    }

    fn challenge_toggle(&self, id: i64) -> Result<Challenge, StoreError> {
        let mut state = self.state()?;
        let item = toggle_by_id(&mut state.challenges, id, |c| c.id, |c| c.published = !c.published)
            .ok_or(StoreError::NotFound)?;
        self.persist(&state)?;
        Ok(item)
    }

    // ── Certificates ────────────────────────────────────────────────

    fn certificate_list(&self) -> Result<Vec<Certificate>, StoreError> {
        Ok(self.state()?.certificates.clone())
    }

    fn certificate_upsert(&self, raw: &Value) -> Result<Certificate, StoreError> {
        let mut state = self.state()?;
        let item = upsert_by_id(&mut state.certificates, Certificate::from_value(raw), |c| c.id);
        self.persist(&state)?;
        Ok(item)
    }

    fn certificate_delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state()?;
        delete_by_id(&mut state.certificates, id, |c| c.id);
        self.persist(&state)
    }

    fn certificate_toggle(&self, id: i64) -> Result<Certificate, StoreError> {
        let mut state = self.state()?;
        let item = toggle_by_id(
            &mut state.certificates,
            id,
            |c| c.id,
            |c| c.published = !c.published,
        )
        .ok_or(StoreError::NotFound)?;
        self.persist(&state)?;
        Ok(item)
    }

    // ── Projects ────────────────────────────────────────────────────

    fn project_list(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.state()?.projects.clone())
    }

    fn project_upsert(&self, raw: &Value) -> Result<Project, StoreError> {
        let mut state = self.state()?;
        let item = upsert_by_id(&mut state.projects, Project::from_value(raw), |p| p.id);
        self.persist(&state)?;
        Ok(item)
    }

    fn project_delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state()?;
        delete_by_id(&mut state.projects, id, |p| p.id);
        self.persist(&state)
    }

    fn project_toggle(&self, id: i64) -> Result<Project, StoreError> {
        let mut state = self.state()?;
        let item = toggle_by_id(&mut state.projects, id, |p| p.id, |p| p.published = !p.published)
            .ok_or(StoreError::NotFound)?;
        self.persist(&state)?;
        Ok(item)
    }

    // ── Research ────────────────────────────────────────────────────

    fn research_list(&self) -> Result<Vec<ResearchItem>, StoreError> {
        Ok(self.state()?.research.clone())
    }

    fn research_upsert(&self, raw: &Value) -> Result<ResearchItem, StoreError> {
        let mut state = self.state()?;
        let item = upsert_by_id(&mut state.research, ResearchItem::from_value(raw), |r| r.id);
        self.persist(&state)?;
        Ok(item)
    }

    fn research_delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state()?;
        delete_by_id(&mut state.research, id, |r| r.id);
        self.persist(&state)
    }

    fn research_toggle(&self, id: i64) -> Result<ResearchItem, StoreError> {
        let mut state = self.state()?;
        let item = toggle_by_id(&mut state.research, id, |r| r.id, |r| r.published = !r.published)
            .ok_or(StoreError::NotFound)?;
        self.persist(&state)?;
        Ok(item)
    }

    // ── Gallery ─────────────────────────────────────────────────────

    fn gallery_list(&self) -> Result<Vec<GalleryItem>, StoreError> {
        Ok(self.state()?.gallery.clone())
    }

    fn gallery_upsert(&self, raw: &Value) -> Result<GalleryItem, StoreError> {
        let mut state = self.state()?;
        let item = upsert_by_id(&mut state.gallery, GalleryItem::from_value(raw), |g| g.id);
        self.persist(&state)?;
        Ok(item)
    }

    fn gallery_delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state()?;
        delete_by_id(&mut state.gallery, id, |g| g.id);
        self.persist(&state)
    }

    fn gallery_toggle(&self, id: i64) -> Result<GalleryItem, StoreError> {
        let mut state = self.state()?;
        let item = toggle_by_id(&mut state.gallery, id, |g| g.id, |g| g.published = !g.published)
            .ok_or(StoreError::NotFound)?;
        self.persist(&state)?;
        Ok(item)
    }

    // ── Site settings ───────────────────────────────────────────────

    fn settings_get(&self) -> Result<SiteSettings, StoreError> {
        Ok(self.state()?.site.clone())
    }

    fn settings_update(&self, settings: &SiteSettings) -> Result<(), StoreError> {
        let mut state = self.state()?;
        state.site = settings.clone();
        self.persist(&state)
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.state()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> LocalStore {
        let store = LocalStore::in_memory(Snapshot::default());
        for i in 1..=17 {
            store
                .challenge_upsert(&json!({
                    "id": i,
                    "title": format!("Challenge {}", i),
                    "category": "tryhackme",
                    "tags": ["web"],
                }))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_pagination_17_items_page_3_of_8() {
        let store = seeded();
        let page = store
            .challenge_list(&ChallengeFilter::default(), 3, 8)
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 17);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_page_clamps_after_bulk_delete() {
        let store = seeded();
        for i in 1..=10 {
            store.challenge_delete(i).unwrap();
        }
        let page = store
            .challenge_list(&ChallengeFilter::default(), 3, 8)
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total, 7);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let store = seeded();
        store
            .challenge_upsert(&json!({"id": 5, "title": "Edited", "tags": ["web"]}))
            .unwrap();
        let page = store
            .challenge_list(&ChallengeFilter::default(), 1, 20)
            .unwrap();
        assert_eq!(page.total, 17);
        // Position 4 (0-indexed) still holds id 5.
        assert_eq!(page.items[4].id, 5);
        assert_eq!(page.items[4].title, "Edited");
    }

    #[test]
    fn test_upsert_renormalizes() {
        let store = LocalStore::in_memory(Snapshot::default());
        let item = store
            .challenge_upsert(&json!({"id": 1, "title": "X", "platform": "htb", "categories": "web, pwn"}))
            .unwrap();
        assert_eq!(item.platform, "HackTheBox");
        assert_eq!(item.tags, vec!["web", "pwn"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = seeded();
        store.challenge_delete(3).unwrap();
        // Second delete of the same id is silently absorbed.
        store.challenge_delete(3).unwrap();
        let page = store
            .challenge_list(&ChallengeFilter::default(), 1, 50)
            .unwrap();
        assert_eq!(page.total, 16);
    }

    #[test]
    fn test_toggle_reports_not_found() {
        let store = seeded();
        let err = store.challenge_toggle(9999).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        let page = store
            .challenge_list(&ChallengeFilter::default(), 1, 50)
            .unwrap();
        assert_eq!(page.total, 17);
        assert!(page.items.iter().all(|c| c.published));
    }

    #[test]
    fn test_toggle_flips_published() {
        let store = seeded();
        let item = store.challenge_toggle(4).unwrap();
        assert!(!item.published);
        let item = store.challenge_toggle(4).unwrap();
        assert!(item.published);
    }

    #[test]
    fn test_search_filter() {
        let store = LocalStore::in_memory(Snapshot::default());
        store
            .challenge_upsert(&json!({"id": 1, "title": "SQL Injection Lab", "platform": "HackTheBox"}))
            .unwrap();
        store
            .challenge_upsert(&json!({"id": 2, "title": "Buffer Overflow", "platform": "TryHackMe"}))
            .unwrap();

        let filter = ChallengeFilter {
            search: Some("sql".into()),
            ..Default::default()
        };
        let page = store.challenge_list(&filter, 1, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, 1);

        let filter = ChallengeFilter {
            platform: Some("TryHackMe".into()),
            ..Default::default()
        };
        let page = store.challenge_list(&filter, 1, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, 2);
    }

    #[test]
    fn test_simple_collections_crud() {
        let store = LocalStore::in_memory(Snapshot::default());
        let cert = store
            .certificate_upsert(&json!({"name": "OSCP", "issuer": "OffSec"}))
            .unwrap();
        assert_eq!(store.certificate_list().unwrap().len(), 1);

        let toggled = store.certificate_toggle(cert.id).unwrap();
        assert!(!toggled.published);

        store.certificate_delete(cert.id).unwrap();
        assert!(store.certificate_list().unwrap().is_empty());
        store.certificate_delete(cert.id).unwrap();
    }

    #[test]
    fn test_settings_roundtrip() {
        let store = LocalStore::in_memory(Snapshot::default());
        let mut settings = store.settings_get().unwrap();
        settings.hero_title = "Hello".into();
        store.settings_update(&settings).unwrap();
        assert_eq!(store.settings_get().unwrap().hero_title, "Hello");
    }

    #[test]
    fn test_draft_blob_persists_and_reloads() {
        let dir = std::env::temp_dir().join(format!("folioctl-test-{}", std::process::id()));
        let path = dir.join("draft.json");
        let _ = std::fs::remove_file(&path);

        let store = LocalStore::new(Snapshot::default(), path.clone());
        store
            .challenge_upsert(&json!({"id": 11, "title": "Persisted", "tags": ["web"], "published": 0}))
            .unwrap();

        let reloaded = LocalStore::load(&path).unwrap();
        let page = reloaded
            .challenge_list(&ChallengeFilter::default(), 1, 10)
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, 11);
        assert!(!page.items[0].published);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
