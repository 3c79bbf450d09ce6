use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{self, AppConfig};
use crate::sync;

#[derive(Debug, Parser)]
#[command(
    name = "redmine-notes",
    version,
    about = "Sync the Redmine issues assigned to you into markdown notes and kanban boards"
)]
pub struct Cli {
    /// Settings file (default: ~/.redmine-notes/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Vault root the notes are written into
    #[arg(long, global = true, value_name = "PATH")]
    pub vault: Option<PathBuf>,

    /// API key for this run only
    #[arg(long, global = true, env = "REDMINE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Redmine URL for this run only
    #[arg(long, global = true, env = "REDMINE_URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch assigned issues and rewrite the ticket notes (the default)
    Sync,
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the stored settings
    Show,
    /// Store one setting: api-key, redmine-url, show-table-props, tickets-dir, vault-path
    Set { key: String, value: String },
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::config_path)
    }

    // One-off flags; never persisted.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(url) = &self.url {
            config.redmine_url = Some(url.clone());
        }
        if let Some(vault) = &self.vault {
            config.vault_path = Some(vault.clone());
        }
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        None | Some(Command::Sync) => handle_sync(&cli).await,
        Some(Command::Config { action }) => {
            handle_config(&cli, action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn handle_sync(cli: &Cli) -> Result<ExitCode> {
    let mut config = config::load_config(&cli.config_path())?;
    cli.apply_overrides(&mut config);

    let notice = sync::sync_and_notify(&config).await;
    if notice.is_error() {
        eprintln!("{notice}");
        Ok(ExitCode::FAILURE)
    } else {
        println!("{notice}");
        Ok(ExitCode::SUCCESS)
    }
}

fn handle_config(cli: &Cli, action: &ConfigAction) -> Result<()> {
    let path = cli.config_path();
    let mut config = config::load_config(&path)?;
    match action {
        ConfigAction::Show => {
            println!("# {}", path.display());
            print!("{}", describe_settings(&config));
        }
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            config::save_config(&path, &config)?;
            println!("Saved {key} to {}", path.display());
        }
    }
    Ok(())
}

pub fn describe_settings(config: &AppConfig) -> String {
    let unset = || "(not set)".to_string();
    format!(
        "api-key          = {}\n\
         redmine-url      = {}\n\
         show-table-props = {}\n\
         tickets-dir      = {}\n\
         vault-path       = {}\n",
        config.api_key.as_deref().map(mask_secret).unwrap_or_else(unset),
        config.redmine_url.clone().unwrap_or_else(unset),
        config.show_table_props,
        config.tickets_dir,
        config
            .vault_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(current directory)".to_string()),
    )
}

// Short keys are hidden entirely; longer ones keep a four-character prefix.
fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 8 {
        return "*".repeat(len.max(4));
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}{}", "*".repeat(len - 4))
}
