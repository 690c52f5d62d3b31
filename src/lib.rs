pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::{AppConfig, NarratorConfig};
use crate::core::manager::ProfileManager;
use crate::core::narration::Narrator;
use crate::core::personality::PersonalityType;
use crate::core::storage::ProfileStore;
use crate::providers::GeminiNarrator;
use crate::store::{DiskStore, MemoryStore};
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Fortune {
        personality: PersonalityType,
        date: Option<NaiveDate>,
        narrate: bool,
        ephemeral: bool,
    },
    History {
        days: usize,
    },
    Export,
    Reset,
    Prefs {
        set: Vec<String>,
    },
}

impl AppCommand {
    fn is_ephemeral(&self) -> bool {
        matches!(self, AppCommand::Fortune { ephemeral: true, .. })
    }
}

fn open_store(config: &AppConfig, ephemeral: bool) -> Result<Box<dyn ProfileStore>> {
    if ephemeral {
        debug!("Using in-memory profile store");
        return Ok(Box::new(MemoryStore::new()));
    }
    let data_path = config.default_data_path()?;
    Ok(Box::new(DiskStore::open(&data_path)?))
}

/// The API key is only ever read from the environment, never from the config.
fn build_narrator(config: &NarratorConfig) -> Option<GeminiNarrator> {
    match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => {
            Some(GeminiNarrator::new(&config.base_url, &config.model, key.trim()))
        }
        _ => {
            warn!(
                env = %config.api_key_env,
                "No narrator API key set, using configured texts"
            );
            None
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("typefortune starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(types = config.types.len(), "Loaded config");

    let store = open_store(&config, command.is_ephemeral())?;
    let mut manager = ProfileManager::load(store, &config.profile_key);

    match command {
        AppCommand::Fortune {
            personality,
            date,
            narrate,
            ..
        } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let narrator = if narrate {
                build_narrator(&config.narrator)
            } else {
                None
            };
            cli::fortune::run(
                &config,
                &mut manager,
                personality,
                date,
                narrator.as_ref().map(|n| n as &dyn Narrator),
            )
            .await
        }
        AppCommand::History { days } => {
            cli::history::run(manager.profile(), days);
            Ok(())
        }
        AppCommand::Export => cli::profile::export(&manager),
        AppCommand::Reset => cli::profile::reset(&mut manager),
        AppCommand::Prefs { set } => cli::profile::prefs(&mut manager, &set),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_fortune_can_be_ephemeral() {
        let fortune = AppCommand::Fortune {
            personality: PersonalityType::Intj,
            date: None,
            narrate: false,
            ephemeral: true,
        };
        assert!(fortune.is_ephemeral());
        assert!(!AppCommand::Export.is_ephemeral());
    }

    #[test]
    fn test_narrator_requires_api_key() {
        let config = NarratorConfig {
            api_key_env: "TYPEFORTUNE_TEST_UNSET_KEY".to_string(),
            ..NarratorConfig::default()
        };
        assert!(build_narrator(&config).is_none());
    }
}
