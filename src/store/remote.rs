use std::sync::Mutex;
use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde_json::{json, Value};

use crate::models::{Certificate, Challenge, GalleryItem, Project, ResearchItem, SiteSettings};
use crate::store::{ChallengeFilter, ContentStore, Page, Snapshot, StoreError};

const TOKEN_HEADER: &str = "X-Admin-Token";

/// Client-side reflection of the remote content API. Every mutation is one
/// blocking round trip; nothing is cached or written locally.
pub struct RemoteStore {
    base_url: String,
    client: Client,
    token: Mutex<Option<String>>,
}

/// Health probe used at boot to decide whether remote mode is available.
pub fn probe(base_url: &str) -> bool {
    let client = match Client::builder().timeout(Duration::from_secs(3)).build() {
        Ok(c) => c,
        Err(_) => return false,
    };
    match client.get(format!("{}/api/health", base_url)).send() {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            warn!("Remote API unreachable at {}: {}", base_url, e);
            false
        }
    }
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Transport(format!("HTTP client error: {}", e)))?;
        Ok(RemoteStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: Mutex::new(None),
        })
    }

    /// Exchange the admin password for a session token.
    pub fn login(&self, password: &str) -> Result<(), StoreError> {
        let resp = self
            .client
            .post(format!("{}/api/admin/login", self.base_url))
            .json(&json!({ "password": password }))
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if resp.status().as_u16() == 401 {
            return Err(StoreError::AuthExpired);
        }
        if !resp.status().is_success() {
            return Err(StoreError::Transport(format!(
                "login failed ({})",
                resp.status()
            )));
        }

        let data: Value = resp
            .json()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let token = data
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| StoreError::Transport("login response missing token".into()))?;

        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        info!("Remote session established");
        Ok(())
    }

    pub fn logout(&self) {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.token.lock().unwrap_or_else(|e| e.into_inner());
        match token.as_deref() {
            Some(t) => builder.header(TOKEN_HEADER, t),
            None => builder,
        }
    }

    /// Send one admin request. 401 drops the session token and surfaces as
    /// `AuthExpired`; 404 as `NotFound`; other failures carry the server's
    /// error message when it sent one.
    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        builder = self.authed(builder);
        if let Some(b) = body {
            builder = builder.json(b);
        }

        let resp = builder
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        match resp.status().as_u16() {
            401 => {
                self.logout();
                Err(StoreError::AuthExpired)
            }
            404 => Err(StoreError::NotFound),
            204 => Ok(Value::Null),
            code if (200..300).contains(&code) => {
                resp.json().map_err(|e| StoreError::Transport(e.to_string()))
            }
            code => {
                let detail = resp
                    .json::<Value>()
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                    .unwrap_or_else(|| format!("request failed ({})", code));
                Err(StoreError::Transport(detail))
            }
        }
    }

    /// Upsert for resources addressed by id: PUT when the record carries an
    /// id the server knows, POST otherwise. A PUT against a vanished id
    /// falls back to create so the operation keeps upsert semantics.
    fn upsert_resource(&self, resource: &str, raw: &Value) -> Result<Value, StoreError> {
        let id = raw.get("id").and_then(|v| v.as_i64());
        if let Some(id) = id {
            match self.send(
                Method::PUT,
                &format!("/api/admin/{}/{}", resource, id),
                Some(raw),
            ) {
                Err(StoreError::NotFound) => {}
                other => return other,
            }
        }
        self.send(Method::POST, &format!("/api/admin/{}", resource), Some(raw))
    }

    fn delete_resource(&self, resource: &str, id: i64) -> Result<(), StoreError> {
        match self.send(
            Method::DELETE,
            &format!("/api/admin/{}/{}", resource, id),
            None,
        ) {
            Ok(_) => Ok(()),
            // Delete is idempotent; a missing id is not an error.
            Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn toggle_resource(&self, resource: &str, id: i64) -> Result<(), StoreError> {
        self.send(
            Method::POST,
            &format!("/api/admin/{}/{}/toggle", resource, id),
            None,
        )
        .map(|_| ())
    }

    fn list_resource(&self, resource: &str) -> Result<Vec<Value>, StoreError> {
        let data = self.send(Method::GET, &format!("/api/admin/{}", resource), None)?;
        Ok(data.as_array().cloned().unwrap_or_default())
    }

    fn find_in_list<T>(
        &self,
        resource: &str,
        id: i64,
        normalize: fn(&Value) -> T,
        id_of: fn(&T) -> i64,
    ) -> Result<T, StoreError> {
        self.list_resource(resource)?
            .iter()
            .map(normalize)
            .find(|item| id_of(item) == id)
            .ok_or(StoreError::NotFound)
    }

    fn challenge_page_raw(&self, query: &str) -> Result<Value, StoreError> {
        self.send(
            Method::GET,
            &format!("/api/admin/challenges?{}", query),
            None,
        )
    }

    /// The toggle endpoint only returns the new flag, so the updated entity
    /// is re-read from the paged admin listing.
    fn find_challenge(&self, id: i64) -> Result<Challenge, StoreError> {
        let mut page = 1usize;
        loop {
            let data = self.challenge_page_raw(&format!("page={}&pageSize=50", page))?;
            let items = data
                .get("items")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            if items.is_empty() {
                return Err(StoreError::NotFound);
            }
            if let Some(found) = items
                .iter()
                .map(Challenge::from_value)
                .find(|c| c.id == id)
            {
                return Ok(found);
            }
            let total = data.get("total").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
            if page * 50 >= total {
                return Err(StoreError::NotFound);
            }
            page += 1;
        }
    }

    fn all_challenges(&self) -> Result<Vec<Challenge>, StoreError> {
        let mut out = Vec::new();
        let mut page = 1usize;
        loop {
            let data = self.challenge_page_raw(&format!("page={}&pageSize=50", page))?;
            let items = data
                .get("items")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            if items.is_empty() {
                return Ok(out);
            }
            out.extend(items.iter().map(Challenge::from_value));
            let total = data.get("total").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
            if out.len() >= total {
                return Ok(out);
            }
            page += 1;
        }
    }
}

impl ContentStore for RemoteStore {
    fn mode(&self) -> &'static str {
        "remote"
    }

    // ── Challenges ──────────────────────────────────────────────────

    fn challenge_list(
        &self,
        filter: &ChallengeFilter,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Challenge>, StoreError> {
        let mut query = format!("page={}&pageSize={}", page.max(1), page_size.max(1));
        for (key, value) in [
            ("search", &filter.search),
            ("category", &filter.category),
            ("status", &filter.status),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push_str(&format!(
                    "&{}={}",
                    key,
                    url::form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>()
                ));
            }
        }

        let data = self.challenge_page_raw(&query)?;
        let mut items: Vec<Challenge> = data
            .get("items")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(Challenge::from_value).collect())
            .unwrap_or_default();

        // The collaborator API has no platform parameter; apply that filter
        // on the reflected page.
        if let Some(p) = filter.platform.as_deref().filter(|v| !v.is_empty()) {
            items.retain(|c| c.platform == p);
        }

        Ok(Page {
            items,
            total: data.get("total").and_then(|v| v.as_u64()).unwrap_or(0) as usize,
            page: data
                .get("page")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(page.max(1)),
            page_size: page_size.max(1),
        })
    }

    fn challenge_upsert(&self, raw: &Value) -> Result<Challenge, StoreError> {
        self.upsert_resource("challenges", raw)
            .map(|v| Challenge::from_value(&v))
    }

    fn challenge_delete(&self, id: i64) -> Result<(), StoreError> {
        self.delete_resource("challenges", id)
    }

    fn challenge_toggle(&self, id: i64) -> Result<Challenge, StoreError> {
        self.toggle_resource("challenges", id)?;
        self.find_challenge(id)
    }

    // ── Certificates ────────────────────────────────────────────────

    fn certificate_list(&self) -> Result<Vec<Certificate>, StoreError> {
        Ok(self
            .list_resource("certificates")?
            .iter()
            .map(Certificate::from_value)
            .collect())
    }

    fn certificate_upsert(&self, raw: &Value) -> Result<Certificate, StoreError> {
        self.upsert_resource("certificates", raw)
            .map(|v| Certificate::from_value(&v))
    }

    fn certificate_delete(&self, id: i64) -> Result<(), StoreError> {
        self.delete_resource("certificates", id)
    }

    fn certificate_toggle(&self, id: i64) -> Result<Certificate, StoreError> {
        self.toggle_resource("certificates", id)?;
        self.find_in_list("certificates", id, Certificate::from_value, |c| c.id)
    }

    // ── Projects ────────────────────────────────────────────────────

    fn project_list(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self
            .list_resource("projects")?
            .iter()
            .map(Project::from_value)
            .collect())
    }

    fn project_upsert(&self, raw: &Value) -> Result<Project, StoreError> {
        self.upsert_resource("projects", raw)
            .map(|v| Project::from_value(&v))
    }

    fn project_delete(&self, id: i64) -> Result<(), StoreError> {
        self.delete_resource("projects", id)
    }

    fn project_toggle(&self, id: i64) -> Result<Project, StoreError> {
        self.toggle_resource("projects", id)?;
        self.find_in_list("projects", id, Project::from_value, |p| p.id)
    }

    // ── Research ────────────────────────────────────────────────────

    fn research_list(&self) -> Result<Vec<ResearchItem>, StoreError> {
        Ok(self
            .list_resource("research")?
            .iter()
            .map(ResearchItem::from_value)
            .collect())
    }

    fn research_upsert(&self, raw: &Value) -> Result<ResearchItem, StoreError> {
        self.upsert_resource("research", raw)
            .map(|v| ResearchItem::from_value(&v))
    }

    fn research_delete(&self, id: i64) -> Result<(), StoreError> {
        self.delete_resource("research", id)
    }

    fn research_toggle(&self, id: i64) -> Result<ResearchItem, StoreError> {
        self.toggle_resource("research", id)?;
        self.find_in_list("research", id, ResearchItem::from_value, |r| r.id)
    }

    // ── Gallery ─────────────────────────────────────────────────────

    fn gallery_list(&self) -> Result<Vec<GalleryItem>, StoreError> {
        Ok(self
            .list_resource("gallery")?
            .iter()
            .map(GalleryItem::from_value)
            .collect())
    }

    fn gallery_upsert(&self, raw: &Value) -> Result<GalleryItem, StoreError> {
        self.upsert_resource("gallery", raw)
            .map(|v| GalleryItem::from_value(&v))
    }

    fn gallery_delete(&self, id: i64) -> Result<(), StoreError> {
        self.delete_resource("gallery", id)
    }

    fn gallery_toggle(&self, id: i64) -> Result<GalleryItem, StoreError> {
        self.toggle_resource("gallery", id)?;
        self.find_in_list("gallery", id, GalleryItem::from_value, |g| g.id)
    }

    // ── Site settings ───────────────────────────────────────────────

    fn settings_get(&self) -> Result<SiteSettings, StoreError> {
        let data = self.send(Method::GET, "/api/admin/settings", None)?;
        Ok(SiteSettings::from_value(
            data.get("site").unwrap_or(&Value::Null),
        ))
    }

    fn settings_update(&self, settings: &SiteSettings) -> Result<(), StoreError> {
        // The settings endpoint spells the badge descriptor
        // "tryhackme_profile".
        let payload = json!({
            "heroTitle": settings.hero_title,
            "heroSummary": settings.hero_summary,
            "about": settings.about,
            "contact": settings.contact,
            "tryhackme_profile": settings.tryhackme,
        });
        self.send(Method::PUT, "/api/admin/settings/site", Some(&payload))
            .map(|_| ())
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            site: self.settings_get()?,
            challenges: self.all_challenges()?,
            certificates: self.certificate_list()?,
            projects: self.project_list()?,
            research: self.research_list()?,
            gallery: self.gallery_list()?,
        })
    }
}
