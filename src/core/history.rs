//! Rolling history aggregation over a [`UserProfile`].
//!
//! Recording a query upserts the day's record, keeps the newest 30 days,
//! refreshes the statistics and unlocks achievements. The read-side views
//! (trend, per-dimension analysis, suggestions) are derived from the retained
//! window on demand.
use crate::core::fortune::{Dimension, FortuneResult, Trend, round_to_tenth};
use crate::core::personality::PersonalityType;
use crate::core::profile::{
    Achievement, DayScore, HistoryRecord, UnlockedAchievement, UserProfile,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const DEFAULT_TREND_WINDOW: usize = 7;

const TREND_THRESHOLD: f64 = 0.5;
const DIMENSION_TREND_WINDOW: usize = 5;
const DIMENSION_TREND_THRESHOLD: f64 = 0.3;
const STREAK_ENCOURAGEMENT_DAYS: u32 = 7;
const LOW_DIMENSION_AVERAGE: f64 = 3.0;
const HIGH_AVERAGE: f64 = 4.0;
const LOW_AVERAGE: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTrend {
    Rising,
    Stable,
    Falling,
    InsufficientData,
}

impl From<Trend> for HistoryTrend {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Rising => HistoryTrend::Rising,
            Trend::Stable => HistoryTrend::Stable,
            Trend::Falling => HistoryTrend::Falling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub trend: HistoryTrend,
    pub change: f64,
    pub average: Option<f64>,
    pub data_points: usize,
}

impl TrendSummary {
    fn insufficient(data_points: usize) -> Self {
        Self {
            trend: HistoryTrend::InsufficientData,
            change: 0.0,
            average: None,
            data_points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionStats {
    pub average: f64,
    pub best: f64,
    pub worst: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    Encouragement { streak_days: u32 },
    Improvement { dimension: Dimension },
    Positive,
    Support,
}

impl Suggestion {
    pub fn message(&self) -> String {
        match self {
            Suggestion::Encouragement { streak_days } => format!(
                "Amazing! You've checked your fortune {streak_days} days in a row. Keep it up!"
            ),
            Suggestion::Improvement { dimension } => format!(
                "Your {dimension} fortune has been dipping lately. It may deserve a little more attention."
            ),
            Suggestion::Positive => {
                "Your overall fortune has been great. Keep that positive outlook!".to_string()
            }
            Suggestion::Support => {
                "Every fortune has its ups and downs. Stay hopeful, better days are coming!"
                    .to_string()
            }
        }
    }
}

fn classify(change: f64, threshold: f64) -> Trend {
    if change > threshold {
        Trend::Rising
    } else if change < -threshold {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

fn mean(scores: &[f64]) -> f64 {
    scores.iter().sum::<f64>() / scores.len() as f64
}

impl UserProfile {
    /// Records one fortune query for `date` and returns the achievements it
    /// unlocked, in unlock order.
    pub fn record_fortune_query(
        &mut self,
        personality: PersonalityType,
        fortune: &FortuneResult,
        date: NaiveDate,
    ) -> Vec<Achievement> {
        self.personality = Some(personality);

        match self.history.iter_mut().find(|r| r.date == date) {
            Some(existing) => {
                existing.personality = personality;
                existing.fortune = fortune.clone();
                existing.query_count += 1;
                debug!(%date, query_count = existing.query_count, "Merged repeat query");
            }
            None => self.history.push(HistoryRecord {
                date,
                personality,
                fortune: fortune.clone(),
                query_count: 1,
            }),
        }

        // Truncate first so the average only covers retained days.
        self.normalize_history();
        self.update_statistics(fortune.overall.score, date);
        self.unlock_achievements(date)
    }

    fn update_statistics(&mut self, score: f64, date: NaiveDate) {
        let scores: Vec<f64> = self
            .history
            .iter()
            .map(|r| r.fortune.overall.score)
            .collect();
        let stats = &mut self.statistics;

        stats.total_queries += 1;
        if !scores.is_empty() {
            stats.average_fortune = round_to_tenth(mean(&scores));
        }

        let today = DayScore { date, score };
        if stats.best_day.is_none_or(|best| score > best.score) {
            stats.best_day = Some(today);
        }
        if stats.worst_day.is_none_or(|worst| score < worst.score) {
            stats.worst_day = Some(today);
        }

        match stats.last_query_date {
            Some(last) => {
                let gap = (date - last).num_days();
                if gap == 1 {
                    stats.streak_days += 1;
                } else if gap > 1 {
                    stats.streak_days = 1;
                }
            }
            None => stats.streak_days = 1,
        }
        stats.last_query_date = Some(date);

        debug!(
            total_queries = stats.total_queries,
            average = stats.average_fortune,
            streak = stats.streak_days,
            "Updated statistics"
        );
    }

    fn unlock_achievements(&mut self, date: NaiveDate) -> Vec<Achievement> {
        let unlocked: Vec<Achievement> = Achievement::ALL
            .into_iter()
            .filter(|a| !self.has_achievement(*a) && a.is_met(self))
            .collect();

        for achievement in &unlocked {
            info!(
                id = achievement.id(),
                name = achievement.name(),
                "Achievement unlocked"
            );
            self.achievements.push(UnlockedAchievement {
                id: *achievement,
                unlocked_on: date,
            });
        }
        unlocked
    }

    /// Compares the oldest and newest overall scores among the most recent
    /// `window_days` records.
    pub fn trend(&self, window_days: usize) -> TrendSummary {
        let window = &self.history[..window_days.min(self.history.len())];
        let (Some(newest), Some(oldest)) = (window.first(), window.last()) else {
            return TrendSummary::insufficient(window.len());
        };
        if window.len() < 2 {
            return TrendSummary::insufficient(window.len());
        }

        let scores: Vec<f64> = window.iter().map(|r| r.fortune.overall.score).collect();
        let change = newest.fortune.overall.score - oldest.fortune.overall.score;
        TrendSummary {
            trend: classify(change, TREND_THRESHOLD).into(),
            change: round_to_tenth(change),
            average: Some(round_to_tenth(mean(&scores))),
            data_points: window.len(),
        }
    }

    /// Per-dimension statistics across the retained history, or `None` when
    /// there is no history yet.
    pub fn dimension_analysis(&self) -> Option<BTreeMap<Dimension, DimensionStats>> {
        if self.history.is_empty() {
            return None;
        }

        let analysis = Dimension::ALL
            .into_iter()
            .filter_map(|dimension| {
                let scores: Vec<f64> = self
                    .history
                    .iter()
                    .filter_map(|r| r.fortune.dimension_score(dimension))
                    .collect();
                if scores.is_empty() {
                    return None;
                }
                let stats = DimensionStats {
                    average: round_to_tenth(mean(&scores)),
                    best: scores.iter().copied().fold(f64::MIN, f64::max),
                    worst: scores.iter().copied().fold(f64::MAX, f64::min),
                    trend: self.dimension_trend(dimension),
                };
                Some((dimension, stats))
            })
            .collect();
        Some(analysis)
    }

    fn dimension_trend(&self, dimension: Dimension) -> Trend {
        let recent: Vec<f64> = self
            .history
            .iter()
            .take(DIMENSION_TREND_WINDOW)
            .filter_map(|r| r.fortune.dimension_score(dimension))
            .collect();
        match (recent.first(), recent.last()) {
            (Some(newest), Some(oldest)) if recent.len() >= 2 => {
                classify(newest - oldest, DIMENSION_TREND_THRESHOLD)
            }
            _ => Trend::Stable,
        }
    }

    /// Guidance derived from the streak, weak dimensions and overall average.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        let stats = &self.statistics;
        let mut suggestions = Vec::new();

        if stats.streak_days >= STREAK_ENCOURAGEMENT_DAYS {
            suggestions.push(Suggestion::Encouragement {
                streak_days: stats.streak_days,
            });
        }

        if let Some(analysis) = self.dimension_analysis() {
            suggestions.extend(
                analysis
                    .into_iter()
                    .filter(|(_, s)| s.trend == Trend::Falling && s.average < LOW_DIMENSION_AVERAGE)
                    .map(|(dimension, _)| Suggestion::Improvement { dimension }),
            );
        }

        if !self.history.is_empty() {
            if stats.average_fortune >= HIGH_AVERAGE {
                suggestions.push(Suggestion::Positive);
            } else if stats.average_fortune < LOW_AVERAGE {
                suggestions.push(Suggestion::Support);
            }
        }

        suggestions
    }
}
