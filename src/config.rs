use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::Result;
use uuid::Uuid;

const BASE_URL_ENV: &str = "API_BASE_URL";
const PREFS_PATH_ENV: &str = "COCORO_PREFS";
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_PREFS_PATH: &str = "prefs.yaml";

/// Local override store, the client-side equivalent of player prefs.
/// Every field is optional; a missing file means empty prefs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub character_id: Option<String>,
}

impl Prefs {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::debug!("No prefs file at {}, using empty prefs", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let prefs: Prefs = serde_yaml::from_str(&content)?;
        Ok(prefs)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

/// Resolved client settings after the prefs/env/default cascade.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub user_id: String,
    pub character_id: Option<String>,
}

pub fn prefs_path() -> String {
    std::env::var(PREFS_PATH_ENV).unwrap_or_else(|_| DEFAULT_PREFS_PATH.to_string())
}

/// Base URL precedence: prefs override, then process environment, then the
/// hardcoded default. First non-empty value wins.
pub fn resolve_base_url(prefs: &Prefs) -> String {
    resolve_base_url_from(
        prefs.api_base_url.as_deref(),
        std::env::var(BASE_URL_ENV).ok().as_deref(),
    )
}

fn resolve_base_url_from(override_url: Option<&str>, env_url: Option<&str>) -> String {
    if let Some(url) = override_url {
        if !url.trim().is_empty() {
            return url.trim_end_matches('/').to_string();
        }
    }
    if let Some(url) = env_url {
        if !url.trim().is_empty() {
            return url.trim_end_matches('/').to_string();
        }
    }
    DEFAULT_BASE_URL.to_string()
}

impl Settings {
    /// Resolve settings from a prefs store. A missing user id is filled with
    /// a fresh UUID so the client always has a stable identity for the
    /// session; the character id may stay unset and be picked later.
    pub fn from_prefs(prefs: &Prefs) -> Self {
        let user_id = match prefs.user_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => {
                let id = Uuid::new_v4().to_string();
                tracing::info!("No user_id configured, generated {}", id);
                id
            }
        };
        Self {
            base_url: resolve_base_url(prefs),
            user_id,
            character_id: prefs
                .character_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn override_beats_env_and_default() {
        let url = resolve_base_url_from(Some("http://prefs:9000"), Some("http://env:9001"));
        assert_eq!(url, "http://prefs:9000");
    }

    #[test]
    fn env_beats_default_when_no_override() {
        let url = resolve_base_url_from(None, Some("http://env:9001"));
        assert_eq!(url, "http://env:9001");
    }

    #[test]
    fn empty_values_fall_through() {
        let url = resolve_base_url_from(Some(""), Some("   "));
        assert_eq!(url, DEFAULT_BASE_URL);
        assert_eq!(resolve_base_url_from(None, None), DEFAULT_BASE_URL);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let url = resolve_base_url_from(Some("http://prefs:9000/"), None);
        assert_eq!(url, "http://prefs:9000");
    }

    #[test]
    fn missing_prefs_file_yields_empty_prefs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.yaml");
        let prefs = Prefs::load(path.to_str().unwrap()).unwrap();
        assert!(prefs.api_base_url.is_none());
        assert!(prefs.user_id.is_none());
        assert!(prefs.character_id.is_none());
    }

    #[test]
    fn prefs_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "api_base_url: http://localhost:8080").unwrap();
        writeln!(file, "user_id: 1f494426-588c-4a74-a5a0-6d9d1dafebec").unwrap();

        let prefs = Prefs::load(path.to_str().unwrap()).unwrap();
        assert_eq!(prefs.api_base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(
            prefs.user_id.as_deref(),
            Some("1f494426-588c-4a74-a5a0-6d9d1dafebec")
        );
        assert!(prefs.character_id.is_none());
    }

    #[test]
    fn settings_generate_user_id_when_unset() {
        let prefs = Prefs::default();
        let settings = Settings::from_prefs(&prefs);
        assert!(Uuid::parse_str(&settings.user_id).is_ok());
        assert!(settings.character_id.is_none());
    }

    #[test]
    fn settings_keep_configured_ids() {
        let prefs = Prefs {
            api_base_url: None,
            user_id: Some("user-1".to_string()),
            character_id: Some("char-1".to_string()),
        };
        let settings = Settings::from_prefs(&prefs);
        assert_eq!(settings.user_id, "user-1");
        assert_eq!(settings.character_id.as_deref(), Some("char-1"));
    }
}
