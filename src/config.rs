use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redmine_url: Option<String>,
    #[serde(default)]
    pub show_table_props: bool,
    #[serde(default = "default_tickets_dir")]
    pub tickets_dir: String,
    /// Root of the notes vault. Falls back to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            redmine_url: None,
            show_table_props: false,
            tickets_dir: default_tickets_dir(),
            vault_path: None,
        }
    }
}

fn default_tickets_dir() -> String {
    "Tickets/".to_string()
}

impl AppConfig {
    pub fn vault_root(&self) -> PathBuf {
        self.vault_path
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        match key {
            "api-key" => self.api_key = optional(value),
            "redmine-url" => self.redmine_url = optional(value),
            "show-table-props" => {
                self.show_table_props = value
                    .trim()
                    .parse()
                    .with_context(|| format!("show-table-props expects true or false, got {value:?}"))?;
            }
            "tickets-dir" => {
                if value.trim().is_empty() {
                    bail!("tickets-dir cannot be empty");
                }
                self.tickets_dir = value.trim().to_string();
            }
            "vault-path" => self.vault_path = optional(value).map(PathBuf::from),
            other => bail!(
                "Unknown setting {other:?}. Expected one of: api-key, redmine-url, show-table-props, tickets-dir, vault-path"
            ),
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".redmine-notes")
        .join("config.toml")
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}
