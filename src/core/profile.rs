//! User profile data: retained history, statistics and achievements.
use crate::core::fortune::FortuneResult;
use crate::core::personality::PersonalityType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const PROFILE_VERSION: &str = "1.0";

/// Number of distinct days kept in the history window.
pub const HISTORY_LIMIT: usize = 30;

/// Caller-owned settings, stored and merged but never interpreted here.
pub type Preferences = BTreeMap<String, Value>;

pub fn default_preferences() -> Preferences {
    BTreeMap::from([
        ("language".to_string(), json!("en")),
        ("theme".to_string(), json!("auto")),
        ("notifications".to_string(), json!(true)),
        ("detailed_analysis".to_string(), json!(true)),
        ("historical_comparison".to_string(), json!(true)),
    ])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub personality: PersonalityType,
    pub fortune: FortuneResult,
    pub query_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayScore {
    pub date: NaiveDate,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_queries: u32,
    pub average_fortune: f64,
    pub best_day: Option<DayScore>,
    pub worst_day: Option<DayScore>,
    pub streak_days: u32,
    pub last_query_date: Option<NaiveDate>,
}

/// Milestones, checked in declaration order after every recorded query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstQuery,
    WeekStreak,
    MonthStreak,
    LuckyDay,
    Explorer,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::FirstQuery,
        Achievement::WeekStreak,
        Achievement::MonthStreak,
        Achievement::LuckyDay,
        Achievement::Explorer,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstQuery => "first_query",
            Achievement::WeekStreak => "week_streak",
            Achievement::MonthStreak => "month_streak",
            Achievement::LuckyDay => "lucky_day",
            Achievement::Explorer => "explorer",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstQuery => "First Steps",
            Achievement::WeekStreak => "One Week Strong",
            Achievement::MonthStreak => "One Month Strong",
            Achievement::LuckyDay => "Lucky Star",
            Achievement::Explorer => "Fortune Explorer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstQuery => "Checked your fortune for the first time",
            Achievement::WeekStreak => "Checked your fortune 7 days in a row",
            Achievement::MonthStreak => "Checked your fortune 30 days in a row",
            Achievement::LuckyDay => "Got a perfect fortune score",
            Achievement::Explorer => "Checked your fortune more than 50 times",
        }
    }

    pub(crate) fn is_met(&self, profile: &UserProfile) -> bool {
        let stats = &profile.statistics;
        match self {
            Achievement::FirstQuery => stats.total_queries >= 1,
            Achievement::WeekStreak => stats.streak_days >= 7,
            Achievement::MonthStreak => stats.streak_days >= 30,
            Achievement::LuckyDay => profile
                .history
                .iter()
                .any(|r| r.fortune.overall.score >= 5.0),
            Achievement::Explorer => stats.total_queries >= 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: Achievement,
    pub unlocked_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "type")]
    pub personality: Option<PersonalityType>,
    pub preferences: Preferences,
    /// Most recent first, one record per day.
    pub history: Vec<HistoryRecord>,
    pub statistics: Statistics,
    pub achievements: Vec<UnlockedAchievement>,
}

impl Default for UserProfile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: PROFILE_VERSION.to_string(),
            created_at: now,
            last_updated: now,
            personality: None,
            preferences: default_preferences(),
            history: Vec::new(),
            statistics: Statistics::default(),
            achievements: Vec::new(),
        }
    }
}

/// Serializable snapshot handed out by `export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileExport {
    pub profile: UserProfile,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

impl UserProfile {
    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.iter().any(|a| a.id == achievement)
    }

    pub fn record_for(&self, date: NaiveDate) -> Option<&HistoryRecord> {
        self.history.iter().find(|r| r.date == date)
    }

    /// Sorts newest first, drops duplicate days and keeps the newest
    /// `HISTORY_LIMIT` days.
    pub fn normalize_history(&mut self) {
        self.history.sort_by(|a, b| b.date.cmp(&a.date));
        self.history.dedup_by_key(|r| r.date);
        self.history.truncate(HISTORY_LIMIT);
    }

    /// Merges `updates` into the stored preferences.
    pub fn update_preferences(&mut self, updates: Preferences) {
        self.preferences.extend(updates);
    }

    pub fn export(&self) -> ProfileExport {
        ProfileExport {
            profile: self.clone(),
            exported_at: Utc::now(),
            version: PROFILE_VERSION.to_string(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{"type": "INFJ"}"#).unwrap();
        assert_eq!(profile.personality, Some(PersonalityType::Infj));
        assert_eq!(profile.version, PROFILE_VERSION);
        assert_eq!(profile.preferences, default_preferences());
        assert!(profile.history.is_empty());
        assert_eq!(profile.statistics, Statistics::default());
    }

    #[test]
    fn test_update_preferences_merges_keys() {
        let mut profile = UserProfile::default();
        profile.update_preferences(BTreeMap::from([
            ("theme".to_string(), json!("dark")),
            ("reminders".to_string(), json!(false)),
        ]));
        assert_eq!(profile.preferences["theme"], json!("dark"));
        assert_eq!(profile.preferences["reminders"], json!(false));
        assert_eq!(profile.preferences["language"], json!("en"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut profile = UserProfile {
            personality: Some(PersonalityType::Estp),
            ..Default::default()
        };
        profile.statistics.total_queries = 9;
        profile.reset();
        assert!(profile.personality.is_none());
        assert_eq!(profile.statistics.total_queries, 0);
    }

    #[test]
    fn test_export_wraps_profile() {
        let profile = UserProfile::default();
        let export = profile.export();
        assert_eq!(export.version, PROFILE_VERSION);
        assert_eq!(export.profile, profile);
        let json = serde_json::to_value(&export).unwrap();
        assert!(json["profile"]["statistics"]["total_queries"].is_number());
    }

    #[test]
    fn test_achievement_ids_match_serialized_form() {
        for achievement in Achievement::ALL {
            let json = serde_json::to_string(&achievement).unwrap();
            assert_eq!(json, format!("\"{}\"", achievement.id()));
        }
    }
}
