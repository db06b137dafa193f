use directories::BaseDirs;
use serde::Deserialize;
use std::{env, fs, path::PathBuf, time::Duration};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a knowledgeable skincare advisor. You build AM/PM \
     routines from the products the user has selected, explain application order, and keep \
     advice specific to those products.";

#[derive(Clone, Debug, Deserialize)]
pub struct RoutineFileConfig {
    pub endpoint: Option<String>,
    pub catalog: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct RoutineConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Local path or http(s) URL of the product catalog document.
    pub catalog: String,
    pub system_prompt: String,
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl RoutineConfig {
    /// Environment wins over the config file; the file fills in the rest.
    pub fn from_env_and_file() -> anyhow::Result<Self> {
        let mut endpoint = env::var("GLOW_ENDPOINT").ok();
        let api_key = env::var("GLOW_API_KEY").ok();

        let mut catalog = "products.json".to_string();
        let mut system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
        let mut timeout_ms = 30_000u64;

        if let Some(path) = Self::config_path() {
            if path.exists() {
                let text = fs::read_to_string(&path)?;
                let file_cfg: RoutineFileConfig = toml::from_str(&text)?;
                if endpoint.is_none() {
                    endpoint = file_cfg.endpoint;
                }
                if let Some(c) = file_cfg.catalog {
                    catalog = c;
                }
                if let Some(s) = file_cfg.system_prompt {
                    system_prompt = s;
                }
                if let Some(t) = file_cfg.timeout_ms {
                    timeout_ms = t;
                }
            }
        }

        let endpoint = endpoint
            .ok_or_else(|| anyhow::anyhow!("GLOW_ENDPOINT not set and no endpoint in config"))?;

        let proxy = env::var("HTTPS_PROXY")
            .ok()
            .or_else(|| env::var("HTTP_PROXY").ok());

        Ok(RoutineConfig {
            endpoint,
            api_key,
            catalog,
            system_prompt,
            timeout: Duration::from_millis(timeout_ms),
            proxy,
        })
    }

    fn config_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        let p = if cfg!(target_os = "windows") {
            base.home_dir().join(".glow").join("config.toml")
        } else {
            base.config_dir().join("glow").join("config.toml")
        };
        Some(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_parses_partial_tables() {
        let cfg: RoutineFileConfig = toml::from_str(
            r#"
            endpoint = "https://worker.example/chat"
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.endpoint.as_deref(), Some("https://worker.example/chat"));
        assert_eq!(cfg.timeout_ms, Some(5000));
        assert!(cfg.catalog.is_none());
        assert!(cfg.system_prompt.is_none());
    }
}
