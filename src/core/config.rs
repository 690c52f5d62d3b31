use crate::core::fortune::{BaseScores, EventTemplates, FortuneEngine};
use crate::core::manager::DEFAULT_PROFILE_KEY;
use crate::core::personality::PersonalityType;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Display data and base fortune for one personality type.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TypeProfile {
    pub title: String,
    #[serde(default)]
    pub emoji: String,
    pub base_fortune: u8,
    pub love: String,
    pub work: String,
    pub tip: String,
    pub lucky_color: String,
    pub lucky_item: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NarratorConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        NarratorConfig {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

fn default_profile_key() -> String {
    DEFAULT_PROFILE_KEY.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub types: BTreeMap<PersonalityType, TypeProfile>,
    #[serde(default)]
    pub events: Option<EventTemplates>,
    #[serde(default)]
    pub narrator: NarratorConfig,
    #[serde(default = "default_profile_key")]
    pub profile_key: String,
    pub data_path: Option<String>,
}

impl BaseScores for AppConfig {
    fn base_score(&self, code: &str) -> Option<f64> {
        let personality = code.parse::<PersonalityType>().ok()?;
        self.types
            .get(&personality)
            .map(|t| f64::from(t.base_fortune))
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the bundled example
    /// when none has been set up.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using bundled defaults",
                config_path.display()
            );
            return Self::from_yaml(EXAMPLE_CONFIG);
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "typefortune", "typefortune")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "typefortune", "typefortune")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (personality, profile) in &self.types {
            if !(1..=5).contains(&profile.base_fortune) {
                anyhow::bail!(
                    "Base fortune for {} must be between 1 and 5, got {}",
                    personality,
                    profile.base_fortune
                );
            }
        }
        if let Some(events) = &self.events {
            events.validate().context("Invalid event texts")?;
        }
        Ok(())
    }

    pub fn type_profile(&self, personality: PersonalityType) -> Option<&TypeProfile> {
        self.types.get(&personality)
    }

    pub fn engine(&self) -> FortuneEngine {
        self.events
            .clone()
            .map_or_else(FortuneEngine::new, FortuneEngine::with_templates)
    }
}
