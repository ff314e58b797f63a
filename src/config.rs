//! Application Configuration
//!
//! Defaults are compiled in; a JSON override may be stored in
//! `localStorage["todo-admin.config"]` for pointing at another backend.

use list_view::ListViewConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:1337";
const CONFIG_STORAGE_KEY: &str = "todo-admin.config";

/// Which Strapi API the todos table talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TodoBackend {
    #[default]
    Graphql,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub graphql_path: String,
    pub todo_backend: TodoBackend,
    /// Upper bound on options loaded for reference selects
    pub related_limit: usize,
    pub log_capacity: usize,
    pub list_view: ListViewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("TODO_ADMIN_API_URL").unwrap_or(DEFAULT_API_URL).to_string(),
            graphql_path: "/graphql".to_string(),
            todo_backend: TodoBackend::default(),
            related_limit: 100,
            log_capacity: 500,
            list_view: ListViewConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), self.graphql_path)
    }

    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.api_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Defaults, overridden by the stored JSON when it parses
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(CONFIG_STORAGE_KEY).ok().flatten());
        match stored.map(|raw| Self::from_json(&raw)) {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                log::warn!("ignoring invalid stored config: {}", err);
                Self::default()
            }
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_cleanly() {
        let config = AppConfig { api_base_url: "https://api.example.com/".into(), ..Default::default() };
        assert_eq!(config.graphql_url(), "https://api.example.com/graphql");
        assert_eq!(config.rest_url("/todos"), "https://api.example.com/api/todos");
    }

    #[test]
    fn test_override_keeps_unspecified_defaults() {
        let config = AppConfig::from_json(r#"{"todo_backend": "rest", "list_view": {"debounce_ms": 300}}"#).unwrap();
        assert_eq!(config.todo_backend, TodoBackend::Rest);
        assert_eq!(config.list_view.debounce_ms, 300);
        assert_eq!(config.list_view.default_page_size, 10);
        assert_eq!(config.graphql_path, "/graphql");
    }
}
