use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Certificate, Challenge, GalleryItem, Project, ResearchItem, SiteSettings};

pub mod local;
pub mod remote;

/// What can go wrong inside a store. Malformed input is deliberately absent:
/// normalization is total and never fails.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Surfaced for toggle/edit on a missing id. Delete swallows this.
    #[error("item not found")]
    NotFound,
    /// Remote collaborator rejected the session token; the caller must drop
    /// back to the unauthenticated state.
    #[error("session expired")]
    AuthExpired,
    /// Rejected before the collection is touched; form state stays intact.
    #[error("{0}")]
    Validation(String),
    #[error("remote API error: {0}")]
    Transport(String),
    #[error("draft store error: {0}")]
    Storage(String),
}

/// Challenge list filter. Empty/None fields match everything.
#[derive(Debug, Default, Clone)]
pub struct ChallengeFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
}

impl ChallengeFilter {
    pub fn matches(&self, c: &Challenge) -> bool {
        if let Some(q) = self.search.as_deref().filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = c.title.to_lowercase().contains(&q)
                || c.description.to_lowercase().contains(&q)
                || c.platform.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        if let Some(cat) = self.category.as_deref().filter(|v| !v.is_empty()) {
            if !c.matches_category(cat) {
                return false;
            }
        }
        if let Some(p) = self.platform.as_deref().filter(|v| !v.is_empty()) {
            if c.platform != p {
                return false;
            }
        }
        if let Some(s) = self.status.as_deref().filter(|v| !v.is_empty()) {
            if c.status != s {
                return false;
            }
        }
        true
    }
}

/// One page of a filtered listing. `page` is the clamped 1-indexed page the
/// result actually came from.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Slice a filtered list into a 1-indexed page, clamping the requested page
/// into `[1, max_page]` so a shrunk collection never yields an empty window.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let max_page = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, max_page);
    let start = (page - 1) * page_size;
    let items = items.iter().skip(start).take(page_size).cloned().collect();
    Page {
        items,
        total,
        page,
        page_size,
    }
}

/// The full session state: all five collections plus site settings. This is
/// the unit the local draft blob persists and the exporter consumes.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Snapshot {
    pub site: SiteSettings,
    pub challenges: Vec<Challenge>,
    pub certificates: Vec<Certificate>,
    pub projects: Vec<Project>,
    pub research: Vec<ResearchItem>,
    pub gallery: Vec<GalleryItem>,
}

impl Snapshot {
    /// Rebuild a snapshot from a draft blob or equivalent JSON document.
    /// Every record is re-normalized on the way in.
    pub fn from_value(raw: &Value) -> Self {
        fn list<T>(raw: &Value, key: &str, f: impl Fn(&Value) -> T) -> Vec<T> {
            raw.get(key)
                .and_then(|v| v.as_array())
                .map(|items| items.iter().map(f).collect())
                .unwrap_or_default()
        }
        Snapshot {
            site: SiteSettings::from_value(raw.get("site").unwrap_or(&Value::Null)),
            challenges: list(raw, "challenges", Challenge::from_value),
            certificates: list(raw, "certificates", Certificate::from_value),
            projects: list(raw, "projects", Project::from_value),
            research: list(raw, "research", ResearchItem::from_value),
            gallery: list(raw, "gallery", GalleryItem::from_value),
        }
    }
}

/// Unified content-access trait. The binary is written once against this;
/// `LocalStore` (draft blob) and `RemoteStore` (collaborator API) implement it.
pub trait ContentStore: Send + Sync {
    /// Backing mode indicator: "local" or "remote".
    fn mode(&self) -> &'static str;

    // ── Challenges ──────────────────────────────────────────────────
    fn challenge_list(
        &self,
        filter: &ChallengeFilter,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Challenge>, StoreError>;
    fn challenge_upsert(&self, raw: &Value) -> Result<Challenge, StoreError>;
    fn challenge_delete(&self, id: i64) -> Result<(), StoreError>;
    fn challenge_toggle(&self, id: i64) -> Result<Challenge, StoreError>;

    // ── Certificates ────────────────────────────────────────────────
    fn certificate_list(&self) -> Result<Vec<Certificate>, StoreError>;
    fn certificate_upsert(&self, raw: &Value) -> Result<Certificate, StoreError>;
    fn certificate_delete(&self, id: i64) -> Result<(), StoreError>;
    fn certificate_toggle(&self, id: i64) -> Result<Certificate, StoreError>;

    // ── Projects ────────────────────────────────────────────────────
    fn project_list(&self) -> Result<Vec<Project>, StoreError>;
    fn project_upsert(&self, raw: &Value) -> Result<Project, StoreError>;
    fn project_delete(&self, id: i64) -> Result<(), StoreError>;
    fn project_toggle(&self, id: i64) -> Result<Project, StoreError>;

    // ── Research ────────────────────────────────────────────────────
    fn research_list(&self) -> Result<Vec<ResearchItem>, StoreError>;
    fn research_upsert(&self, raw: &Value) -> Result<ResearchItem, StoreError>;
    fn research_delete(&self, id: i64) -> Result<(), StoreError>;
    fn research_toggle(&self, id: i64) -> Result<ResearchItem, StoreError>;

    // ── Gallery ─────────────────────────────────────────────────────
    fn gallery_list(&self) -> Result<Vec<GalleryItem>, StoreError>;
    fn gallery_upsert(&self, raw: &Value) -> Result<GalleryItem, StoreError>;
    fn gallery_delete(&self, id: i64) -> Result<(), StoreError>;
    fn gallery_toggle(&self, id: i64) -> Result<GalleryItem, StoreError>;

    // ── Site settings ───────────────────────────────────────────────
    fn settings_get(&self) -> Result<SiteSettings, StoreError>;
    fn settings_update(&self, settings: &SiteSettings) -> Result<(), StoreError>;

    /// Full state for the exporter.
    fn snapshot(&self) -> Result<Snapshot, StoreError>;
}

/// Authoring-form pre-check for challenges: a title and at least one
/// category/tag are required. Runs before the record reaches any store.
pub fn validate_challenge_form(raw: &Value) -> Result<(), StoreError> {
    let title = crate::normalize::pick_str(raw, &["title"]);
    if title.is_empty() {
        return Err(StoreError::Validation("Title is required".into()));
    }
    let tags = crate::normalize::pick_list(raw, &["tags", "categories"]);
    if tags.is_empty() {
        return Err(StoreError::Validation(
            "Select at least one CTF category".into(),
        ));
    }
    Ok(())
}
