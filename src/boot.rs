use std::fs;

use log::{info, warn};

use crate::config::Config;
use crate::import;
use crate::store::local::LocalStore;
use crate::store::remote::{self, RemoteStore};
use crate::store::{ContentStore, StoreError};

/// Backing mode picked at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Collaborator API answered its health probe.
    Remote,
    /// No API, but a saved draft blob exists.
    LocalDraft,
    /// Fresh start from the static seed documents.
    Seed,
}

/// Run the boot checks and construct the backing store. Remote wins when the
/// collaborator API is healthy; otherwise a saved draft beats the seed
/// documents. Falling back is a mode, not an error.
pub fn run(config: &Config) -> Result<(Mode, Box<dyn ContentStore>), StoreError> {
    info!("folioctl boot check starting...");

    // ── 1. Data directory ──────────────────────────────
    if !config.data_dir.exists() {
        fs::create_dir_all(&config.data_dir).map_err(|e| {
            StoreError::Storage(format!(
                "Failed to create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;
        info!("  Created data directory: {}", config.data_dir.display());
    }

    // ── 2. Remote health probe ─────────────────────────
    if remote::probe(&config.api_url) {
        let store = RemoteStore::new(&config.api_url)?;
        info!("Boot check passed. Mode: remote ({})", config.api_url);
        return Ok((Mode::Remote, Box::new(store)));
    }
    warn!("  Collaborator API not reachable; staying local");

    // ── 3. Saved draft ─────────────────────────────────
    let draft_path = config.draft_path();
    if draft_path.exists() {
        match LocalStore::load(&draft_path) {
            Ok(store) => {
                info!("Boot check passed. Mode: local draft ({})", draft_path.display());
                return Ok((Mode::LocalDraft, Box::new(store)));
            }
            Err(e) => {
                // An unreadable draft must not lose the operator's session
                // silently; keep the file and fall through to the seeds.
                warn!("  Draft blob unusable ({}); falling back to seeds", e);
            }
        }
    }

    // ── 4. Seed documents ──────────────────────────────
    let snapshot = import::load_snapshot(&config.data_dir)?;
    let store = LocalStore::new(snapshot, draft_path);
    info!(
        "Boot check passed. Mode: seed documents ({})",
        config.data_dir.display()
    );
    Ok((Mode::Seed, Box::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn test_config(data_dir: PathBuf) -> Config {
        let mut config = Config::from_env();
        // Point at a closed port so the probe always fails fast.
        config.api_url = "http://127.0.0.1:1".to_string();
        config.data_dir = data_dir;
        config
    }

    #[test]
    fn test_seed_mode_when_nothing_saved() {
        let dir = std::env::temp_dir().join(format!("folioctl-boot-seed-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("challenges.json"),
            json!({ "challenges": [{ "id": 1, "title": "Intro" }] }).to_string(),
        )
        .unwrap();

        let (mode, store) = run(&test_config(dir.clone())).unwrap();
        assert_eq!(mode, Mode::Seed);
        assert_eq!(store.mode(), "local");
        assert_eq!(store.snapshot().unwrap().challenges.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_draft_beats_seed_documents() {
        let dir = std::env::temp_dir().join(format!("folioctl-boot-draft-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("challenges.json"),
            json!({ "challenges": [{ "id": 1, "title": "Seeded" }] }).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.join("draft.json"),
            json!({ "challenges": [{ "id": 2, "title": "Drafted" }] }).to_string(),
        )
        .unwrap();

        let (mode, store) = run(&test_config(dir.clone())).unwrap();
        assert_eq!(mode, Mode::LocalDraft);
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.challenges.len(), 1);
        assert_eq!(snapshot.challenges[0].title, "Drafted");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_draft_falls_back_to_seeds() {
        let dir = std::env::temp_dir().join(format!("folioctl-boot-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("draft.json"), "{not json").unwrap();

        let (mode, _) = run(&test_config(dir.clone())).unwrap();
        assert_eq!(mode, Mode::Seed);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_data_dir_is_created() {
        let dir = std::env::temp_dir().join(format!("folioctl-boot-mkdir-{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();

        let (mode, _) = run(&test_config(dir.clone())).unwrap();
        assert_eq!(mode, Mode::Seed);
        assert!(dir.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
