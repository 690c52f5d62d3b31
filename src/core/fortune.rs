//! Deterministic daily fortune scoring.
//!
//! A fortune is a pure function of a personality code and a calendar day. The
//! only pseudo-randomness is a rolling hash of the two, so the same inputs
//! always produce the same scores. Flavor-text selection is the one place
//! real randomness is used, and the generator is supplied by the caller.
use crate::core::personality::PersonalityType;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;
use std::fmt::Display;
use tracing::debug;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;
pub const DEFAULT_BASE_SCORE: f64 = 3.0;

const DAILY_VARIATION: f64 = 0.8;
const WEEKLY_TREND: f64 = 0.3;
const PERSONAL_CYCLE_DAYS: i64 = 28;
const PERSONAL_AMPLITUDE: f64 = 0.3;
const EVENT_THRESHOLD: f64 = 0.3;
// Sunday first
const WEEKLY_PATTERN: [f64; 7] = [0.1, -0.1, 0.2, 0.0, 0.3, 0.2, -0.2];
// 1970-01-01 counted from 0001-01-01 as day 1
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Love,
    Work,
    Health,
    Wealth,
    Social,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Love,
        Dimension::Work,
        Dimension::Health,
        Dimension::Wealth,
        Dimension::Social,
    ];

    pub fn index(&self) -> u64 {
        match self {
            Dimension::Love => 0,
            Dimension::Work => 1,
            Dimension::Health => 2,
            Dimension::Wealth => 3,
            Dimension::Social => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Love => "love",
            Dimension::Work => "work",
            Dimension::Health => "health",
            Dimension::Wealth => "wealth",
            Dimension::Social => "social",
        }
    }

    fn default_variance(&self) -> f64 {
        match self {
            Dimension::Love => 0.8,
            Dimension::Work => 0.8,
            Dimension::Health => 0.6,
            Dimension::Wealth => 0.9,
            Dimension::Social => 0.7,
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FortuneLevel {
    Excellent,
    Good,
    Average,
    Poor,
    Bad,
}

impl FortuneLevel {
    /// Each band is inclusive of its lower bound.
    pub fn from_score(score: f64) -> Self {
        if score >= 4.5 {
            FortuneLevel::Excellent
        } else if score >= 3.5 {
            FortuneLevel::Good
        } else if score >= 2.5 {
            FortuneLevel::Average
        } else if score >= 1.5 {
            FortuneLevel::Poor
        } else {
            FortuneLevel::Bad
        }
    }
}

impl Display for FortuneLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FortuneLevel::Excellent => "excellent",
            FortuneLevel::Good => "good",
            FortuneLevel::Average => "average",
            FortuneLevel::Poor => "poor",
            FortuneLevel::Bad => "bad",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Stable,
    Falling,
}

impl Trend {
    fn from_date_hash(date_hash: u32) -> Self {
        let value = (date_hash % 100) as f64 / 100.0;
        if value > 0.6 {
            Trend::Rising
        } else if value < 0.4 {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Trend::Rising => "rising",
            Trend::Stable => "stable",
            Trend::Falling => "falling",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Positive,
    Neutral,
    Negative,
}

impl EventCategory {
    pub fn from_modifier(modifier: f64) -> Self {
        if modifier > EVENT_THRESHOLD {
            EventCategory::Positive
        } else if modifier < -EVENT_THRESHOLD {
            EventCategory::Negative
        } else {
            EventCategory::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallFortune {
    pub score: f64,
    pub level: FortuneLevel,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionFortune {
    pub score: f64,
    #[serde(default)]
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub daily: f64,
    pub weekly: f64,
    pub personal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FortuneMetadata {
    pub date_hash: u32,
    pub modifiers: Modifiers,
}

/// One day's fortune for one personality code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortuneResult {
    pub overall: OverallFortune,
    pub dimensions: BTreeMap<Dimension, DimensionFortune>,
    pub metadata: FortuneMetadata,
}

impl FortuneResult {
    pub fn dimension_score(&self, dimension: Dimension) -> Option<f64> {
        self.dimensions.get(&dimension).map(|d| d.score)
    }
}

/// Source of per-type base fortunes, supplied by the caller.
pub trait BaseScores {
    fn base_score(&self, code: &str) -> Option<f64>;
}

impl BaseScores for HashMap<String, f64> {
    fn base_score(&self, code: &str) -> Option<f64> {
        self.get(code).copied()
    }
}

/// Flavor texts for one dimension, split by event category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTexts {
    pub positive: Vec<String>,
    pub neutral: Vec<String>,
    pub negative: Vec<String>,
}

impl CategoryTexts {
    fn from_strs(positive: &[&str], neutral: &[&str], negative: &[&str]) -> Self {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        };
        Self {
            positive: owned(positive),
            neutral: owned(neutral),
            negative: owned(negative),
        }
    }

    pub fn for_category(&self, category: EventCategory) -> &[String] {
        match category {
            EventCategory::Positive => &self.positive,
            EventCategory::Neutral => &self.neutral,
            EventCategory::Negative => &self.negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTemplates(BTreeMap<Dimension, CategoryTexts>);

impl EventTemplates {
    pub fn new(texts: BTreeMap<Dimension, CategoryTexts>) -> Self {
        Self(texts)
    }

    pub fn texts(&self, dimension: Dimension) -> Option<&CategoryTexts> {
        self.0.get(&dimension)
    }

    /// Ensures every dimension has at least one text per category.
    pub fn validate(&self) -> anyhow::Result<()> {
        for dimension in Dimension::ALL {
            let texts = self
                .texts(dimension)
                .ok_or_else(|| anyhow::anyhow!("Missing event texts for dimension {dimension}"))?;
            for category in [
                EventCategory::Positive,
                EventCategory::Neutral,
                EventCategory::Negative,
            ] {
                if texts.for_category(category).is_empty() {
                    anyhow::bail!("Empty {category:?} event texts for dimension {dimension}");
                }
            }
        }
        Ok(())
    }
}

impl Default for EventTemplates {
    fn default() -> Self {
        let mut texts = BTreeMap::new();
        texts.insert(
            Dimension::Love,
            CategoryTexts::from_strs(
                &[
                    "Romance is in the air",
                    "Relationships feel harmonious",
                    "A chance to meet someone special",
                ],
                &["Love life is steady", "A good day to reflect on feelings"],
                &["Be patient with matters of the heart", "Avoid impulsive gestures"],
            ),
        );
        texts.insert(
            Dimension::Work,
            CategoryTexts::from_strs(
                &[
                    "Productivity is high",
                    "Your effort gets noticed",
                    "Projects move forward smoothly",
                ],
                &["Work is steady", "Good for routine tasks"],
                &["Work needs extra focus", "Hold off on big decisions"],
            ),
        );
        texts.insert(
            Dimension::Health,
            CategoryTexts::from_strs(
                &[
                    "Full of energy",
                    "Feeling in great shape",
                    "A great day for exercise",
                ],
                &["Health is steady", "Keep a regular routine"],
                &["Make time to rest", "Avoid overexertion"],
            ),
        );
        texts.insert(
            Dimension::Wealth,
            CategoryTexts::from_strs(
                &[
                    "Money luck is good",
                    "An opportunity may appear",
                    "Income could rise",
                ],
                &["Finances are stable", "Good for budgeting"],
                &["Be careful with money", "Avoid large purchases"],
            ),
        );
        texts.insert(
            Dimension::Social,
            CategoryTexts::from_strs(
                &[
                    "Connections come easily",
                    "Social plans shine",
                    "A great day to make new friends",
                ],
                &["Social life is calm", "Keep in touch with old friends"],
                &["Be patient with others", "Steer clear of arguments"],
            ),
        );
        Self(texts)
    }
}

/// Folds the ISO day and the code into a 32-bit rolling hash.
pub fn date_hash(date: NaiveDate, code: &str) -> u32 {
    let combined = format!("{}{}", date.format("%Y-%m-%d"), code);
    let hash = combined
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32));
    hash.unsigned_abs()
}

/// Rounds half-up to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Adds the modifiers to `base`, clamps to the score range and rounds to one
/// decimal. Every score the engine produces goes through here.
pub fn normalize_score(base: f64, modifiers: &[f64]) -> f64 {
    let total = base + modifiers.iter().sum::<f64>();
    round_to_tenth(total.clamp(MIN_SCORE, MAX_SCORE))
}

fn centered_modifier(hash: u64, variation: f64) -> f64 {
    let normalized = (hash % 1000) as f64 / 1000.0;
    (normalized - 0.5) * 2.0 * variation
}

fn daily_modifier(date_hash: u32) -> f64 {
    centered_modifier(u64::from(date_hash), DAILY_VARIATION)
}

fn weekly_modifier(date: NaiveDate) -> f64 {
    WEEKLY_PATTERN[date.weekday().num_days_from_sunday() as usize] * WEEKLY_TREND
}

fn personal_modifier(date: NaiveDate, personality: Option<PersonalityType>) -> f64 {
    let days_since_epoch = i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE;
    let offset = personality.map_or(0, |p| p.cycle_offset());
    let position = (days_since_epoch + offset).rem_euclid(PERSONAL_CYCLE_DAYS);
    let phase = (position as f64 / PERSONAL_CYCLE_DAYS as f64) * 2.0 * PI;
    phase.sin() * PERSONAL_AMPLITUDE
}

/// Per-type spread of a dimension's modifier. Only four types are tabulated;
/// every other code uses the dimension default.
pub fn dimension_variance(personality: Option<PersonalityType>, dimension: Dimension) -> f64 {
    let row = match personality {
        Some(PersonalityType::Enfp) => [0.9, 0.7, 0.5, 1.2, 0.6],
        Some(PersonalityType::Enfj) => [0.7, 0.8, 0.6, 0.8, 0.5],
        Some(PersonalityType::Entp) => [0.8, 0.9, 0.7, 1.0, 0.6],
        Some(PersonalityType::Entj) => [0.6, 0.5, 0.7, 0.7, 0.8],
        _ => return dimension.default_variance(),
    };
    row[dimension.index() as usize]
}

/// Stateless fortune calculator holding only its flavor-text templates.
#[derive(Debug, Clone, Default)]
pub struct FortuneEngine {
    templates: EventTemplates,
}

impl FortuneEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: EventTemplates) -> Self {
        Self { templates }
    }

    /// Computes the fortune, picking event texts with the thread RNG.
    pub fn compute<B>(&self, code: &str, date: NaiveDate, base_scores: &B) -> FortuneResult
    where
        B: BaseScores + ?Sized,
    {
        self.compute_with_rng(code, date, base_scores, &mut rand::thread_rng())
    }

    /// Computes the fortune for `code` on `date`. Unknown codes fall back to
    /// the default base score and variances. Only event text depends on `rng`.
    pub fn compute_with_rng<B, R>(
        &self,
        code: &str,
        date: NaiveDate,
        base_scores: &B,
        rng: &mut R,
    ) -> FortuneResult
    where
        B: BaseScores + ?Sized,
        R: Rng + ?Sized,
    {
        let personality = code.parse::<PersonalityType>().ok();
        let base = base_scores.base_score(code).unwrap_or(DEFAULT_BASE_SCORE);
        let hash = date_hash(date, code);

        let modifiers = Modifiers {
            daily: daily_modifier(hash),
            weekly: weekly_modifier(date),
            personal: personal_modifier(date, personality),
        };
        let score = normalize_score(base, &[modifiers.daily, modifiers.weekly, modifiers.personal]);
        debug!(code, %date, hash, base, ?modifiers, score, "Computed overall fortune");

        let dimensions = Dimension::ALL
            .into_iter()
            .map(|dimension| {
                let dimension_hash = u64::from(hash) + dimension.index() * 1000;
                let variance = dimension_variance(personality, dimension);
                let modifier = centered_modifier(dimension_hash, variance);
                let fortune = DimensionFortune {
                    score: normalize_score(base, &[modifier]),
                    events: self.pick_events(dimension, modifier, rng),
                };
                (dimension, fortune)
            })
            .collect();

        FortuneResult {
            overall: OverallFortune {
                score,
                level: FortuneLevel::from_score(score),
                trend: Trend::from_date_hash(hash),
            },
            dimensions,
            metadata: FortuneMetadata {
                date_hash: hash,
                modifiers,
            },
        }
    }

    fn pick_events<R: Rng + ?Sized>(
        &self,
        dimension: Dimension,
        modifier: f64,
        rng: &mut R,
    ) -> Vec<String> {
        let category = EventCategory::from_modifier(modifier);
        self.templates
            .texts(dimension)
            .and_then(|texts| texts.for_category(category).choose(rng))
            .cloned()
            .into_iter()
            .collect()
    }
}
