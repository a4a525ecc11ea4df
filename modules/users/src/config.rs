use modkit::api::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Configuration for the users module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            default_page_size: default_page_size(),
        }
    }
}

impl UsersConfig {
    /// `default_page_size` snapped into the allowed page size range.
    pub fn effective_page_size(&self) -> u32 {
        self.default_page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// `base_path` with a leading slash and no trailing slash.
    pub fn normalized_base_path(&self) -> String {
        let trimmed = self.base_path.trim().trim_matches('/');
        format!("/{trimmed}")
    }
}

fn default_base_path() -> String {
    "/api/users".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg: UsersConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.base_path, "/api/users");
        assert_eq!(cfg.default_page_size, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<UsersConfig, _> =
            serde_json::from_value(serde_json::json!({ "page_size": 5 }));
        assert!(res.is_err());
    }

    #[test]
    fn page_size_and_path_are_normalized() {
        let cfg = UsersConfig {
            base_path: "users/".into(),
            default_page_size: 500,
        };
        assert_eq!(cfg.effective_page_size(), 20);
        assert_eq!(cfg.normalized_base_path(), "/users");
    }
}
