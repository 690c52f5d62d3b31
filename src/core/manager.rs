//! Owns one [`UserProfile`] and persists it after every mutation.
use crate::core::fortune::FortuneResult;
use crate::core::personality::PersonalityType;
use crate::core::profile::{Achievement, Preferences, ProfileExport, UserProfile};
use crate::core::storage::ProfileStore;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

pub const DEFAULT_PROFILE_KEY: &str = "user_profile";

pub struct ProfileManager<S: ProfileStore> {
    store: S,
    key: String,
    profile: UserProfile,
}

impl<S: ProfileStore> ProfileManager<S> {
    /// Loads the profile stored under `key`. A missing, unreadable or
    /// malformed profile is replaced by a fresh one.
    pub fn load(store: S, key: &str) -> Self {
        let profile = match store.load(key) {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(mut profile) => {
                    profile.normalize_history();
                    debug!(key, records = profile.history.len(), "Loaded profile");
                    profile
                }
                Err(e) => {
                    warn!(key, error = %e, "Stored profile is malformed, starting fresh");
                    UserProfile::default()
                }
            },
            Ok(None) => {
                debug!(key, "No stored profile, starting fresh");
                UserProfile::default()
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to load profile, starting fresh");
                UserProfile::default()
            }
        };

        Self {
            store,
            key: key.to_string(),
            profile,
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Records a query and saves. The in-memory profile keeps the new record
    /// even when the save fails.
    pub fn record(
        &mut self,
        personality: PersonalityType,
        fortune: &FortuneResult,
        date: NaiveDate,
    ) -> Result<Vec<Achievement>> {
        let unlocked = self
            .profile
            .record_fortune_query(personality, fortune, date);
        self.save()?;
        Ok(unlocked)
    }

    pub fn update_preferences(&mut self, updates: Preferences) -> Result<()> {
        self.profile.update_preferences(updates);
        self.save()
    }

    pub fn reset(&mut self) -> Result<()> {
        self.profile.reset();
        self.save()
    }

    pub fn export(&self) -> ProfileExport {
        self.profile.export()
    }

    pub fn save(&mut self) -> Result<()> {
        self.profile.last_updated = Utc::now();
        let raw = serde_json::to_string(&self.profile).context("Failed to serialize profile")?;
        self.store
            .save(&self.key, &raw)
            .with_context(|| format!("Failed to save profile under key: {}", self.key))?;
        debug!(key = %self.key, bytes = raw.len(), "Saved profile");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fortune::FortuneEngine;
    use crate::store::MemoryStore;
    use anyhow::anyhow;
    use std::collections::{BTreeMap, HashMap};

    struct FailingStore;

    impl ProfileStore for FailingStore {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("storage unavailable"))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    fn intj_fortune(date: NaiveDate) -> FortuneResult {
        let bases = HashMap::from([("INTJ".to_string(), 4.0)]);
        FortuneEngine::new().compute("INTJ", date, &bases)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_record_round_trips_through_store() {
        let store = MemoryStore::new();
        let mut manager = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        let unlocked = manager
            .record(PersonalityType::Intj, &intj_fortune(day(15)), day(15))
            .unwrap();
        assert_eq!(unlocked, vec![Achievement::FirstQuery]);

        let reloaded = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        assert_eq!(reloaded.profile().history.len(), 1);
        assert_eq!(reloaded.profile().statistics.total_queries, 1);
        assert_eq!(reloaded.profile().history[0].fortune.overall.score, 3.4);
        assert!(reloaded.profile().has_achievement(Achievement::FirstQuery));
    }

    #[test]
    fn test_malformed_profile_falls_back_to_default() {
        let store = MemoryStore::new();
        store.save(DEFAULT_PROFILE_KEY, "{not json").unwrap();

        let manager = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        assert!(manager.profile().history.is_empty());
        assert_eq!(manager.profile().statistics.total_queries, 0);
    }

    #[test]
    fn test_load_failure_falls_back_to_default() {
        let manager = ProfileManager::load(FailingStore, DEFAULT_PROFILE_KEY);
        assert!(manager.profile().personality.is_none());
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let mut manager = ProfileManager::load(FailingStore, DEFAULT_PROFILE_KEY);
        let result = manager.record(PersonalityType::Intj, &intj_fortune(day(15)), day(15));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to save profile"));
        assert_eq!(manager.profile().history.len(), 1);
        assert_eq!(manager.profile().statistics.total_queries, 1);
    }

    #[test]
    fn test_reset_and_preferences_are_saved() {
        let store = MemoryStore::new();
        let mut manager = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        manager
            .record(PersonalityType::Intj, &intj_fortune(day(15)), day(15))
            .unwrap();
        manager
            .update_preferences(BTreeMap::from([(
                "theme".to_string(),
                serde_json::json!("dark"),
            )]))
            .unwrap();

        let reloaded = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        assert_eq!(reloaded.profile().preferences["theme"], "dark");

        manager.reset().unwrap();
        let reloaded = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        assert!(reloaded.profile().history.is_empty());
        assert_eq!(reloaded.profile().preferences["theme"], "auto");
    }

    #[test]
    fn test_stale_history_is_truncated_on_load() {
        let store = MemoryStore::new();
        let mut manager = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        for d in 1..=31 {
            manager
                .record(PersonalityType::Intj, &intj_fortune(day(d)), day(d))
                .unwrap();
        }
        assert_eq!(manager.profile().history.len(), 30);

        let export = manager.export();
        assert_eq!(export.profile.history[0].date, day(31));
        let reloaded = ProfileManager::load(&store, DEFAULT_PROFILE_KEY);
        assert_eq!(reloaded.profile().history.len(), 30);
        assert_eq!(reloaded.profile().statistics.streak_days, 31);
    }
}
