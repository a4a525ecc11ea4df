use serde::{Deserialize, Serialize};

pub const DEFAULT_BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// `modules.api_ingress` configuration section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Absolute base for generated links; `http://{host}:{port}` when unset.
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT_BYTES
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            public_url: None,
            cors_enabled: false,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ApiIngressConfig {
    /// The configured public URL, or one derived from the listen address.
    pub fn public_url_or(&self, host: &str, port: u16) -> String {
        match self.public_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                let host = match host {
                    "0.0.0.0" | "::" | "[::]" => "localhost",
                    h => h,
                };
                format!("http://{host}:{port}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: ApiIngressConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!cfg.cors_enabled);
        assert_eq!(cfg.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
        assert!(cfg.public_url.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<ApiIngressConfig, _> =
            serde_json::from_value(serde_json::json!({ "bind_addr": "0.0.0.0:1" }));
        assert!(res.is_err());
    }

    #[test]
    fn public_url_falls_back_to_listen_address() {
        let cfg = ApiIngressConfig::default();
        assert_eq!(cfg.public_url_or("127.0.0.1", 8087), "http://127.0.0.1:8087");
        assert_eq!(cfg.public_url_or("0.0.0.0", 80), "http://localhost:80");

        let cfg = ApiIngressConfig {
            public_url: Some("https://api.example.com".into()),
            ..Default::default()
        };
        assert_eq!(cfg.public_url_or("127.0.0.1", 8087), "https://api.example.com");
    }
}
