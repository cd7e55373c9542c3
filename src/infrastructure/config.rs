use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_CREDENTIAL_SERVICE: &str = "daysched.session";
const DEFAULT_CREDENTIAL_ACCOUNT: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub schema: u8,
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: String,
    #[serde(rename = "credentialService")]
    pub credential_service: String,
    #[serde(rename = "credentialAccount")]
    pub credential_account: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: 1,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credential_service: DEFAULT_CREDENTIAL_SERVICE.to_string(),
            credential_account: DEFAULT_CREDENTIAL_ACCOUNT.to_string(),
        }
    }
}

pub fn ensure_default_config(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(APP_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&AppConfig::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    let path = config_dir.join(APP_JSON);
    let raw = fs::read_to_string(&path)?;
    let parsed: AppConfig = serde_json::from_str(&raw)?;
    if parsed.schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            parsed.schema,
            path.display()
        )));
    }
    if parsed.api_base_url.trim().is_empty() {
        return Err(InfraError::InvalidConfig(format!(
            "apiBaseUrl must not be empty in {}",
            path.display()
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "daysched-config-{tag}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create temp config dir");
        dir
    }

    #[test]
    fn ensure_then_load_yields_defaults() {
        let dir = temp_config_dir("defaults");
        let _ = fs::remove_file(dir.join(APP_JSON));

        ensure_default_config(&dir).expect("write default config");
        let config = load_config(&dir).expect("load config");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_rejects_unknown_schema() {
        let dir = temp_config_dir("schema");
        fs::write(
            dir.join(APP_JSON),
            r#"{"schema":2,"apiBaseUrl":"http://localhost:5000/api","credentialService":"s","credentialAccount":"a"}"#,
        )
        .expect("write config");

        assert!(matches!(
            load_config(&dir),
            Err(InfraError::InvalidConfig(_))
        ));
    }
}
