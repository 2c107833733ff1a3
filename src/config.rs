use std::env;
use std::path::PathBuf;

/// Default admin digest: sha256 of the out-of-the-box password. Overridden
/// with FOLIO_ADMIN_DIGEST in any real deployment.
const DEFAULT_ADMIN_DIGEST: &str =
    "d9493bb755938219730159f498106289738e5bb6ee443a8466df328ad3a630ea";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the collaborator content API.
    pub api_url: String,
    /// sha256 hex digest the local-mode admin password is checked against.
    pub admin_digest: String,
    /// Directory holding the seed JSON documents and the draft blob.
    pub data_dir: PathBuf,
    /// Challenge listing page size.
    pub page_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            api_url: get("FOLIO_API_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            admin_digest: get("FOLIO_ADMIN_DIGEST")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_ADMIN_DIGEST.to_string()),
            data_dir: PathBuf::from(
                get("FOLIO_DATA_DIR")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            page_size: get("FOLIO_PAGE_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// The draft blob lives next to the seed documents.
    pub fn draft_path(&self) -> PathBuf {
        self.data_dir.join("draft.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.admin_digest, DEFAULT_ADMIN_DIGEST);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.page_size, 8);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(|key| match key {
            "FOLIO_API_URL" => Some("https://api.example.net".to_string()),
            "FOLIO_PAGE_SIZE" => Some("20".to_string()),
            _ => None,
        });
        assert_eq!(config.api_url, "https://api.example.net");
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_invalid_page_size_falls_back() {
        let config = Config::from_lookup(|key| match key {
            "FOLIO_PAGE_SIZE" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_draft_path_is_inside_data_dir() {
        let config = Config::from_lookup(|key| match key {
            "FOLIO_DATA_DIR" => Some("/srv/folio".to_string()),
            _ => None,
        });
        assert_eq!(config.draft_path(), PathBuf::from("/srv/folio/draft.json"));
    }
}
