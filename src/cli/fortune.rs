use super::ui;
use crate::core::config::{AppConfig, TypeProfile};
use crate::core::fortune::{Dimension, FortuneResult};
use crate::core::manager::ProfileManager;
use crate::core::narration::{Narration, Narrator};
use crate::core::personality::PersonalityType;
use crate::core::profile::Achievement;
use crate::core::storage::ProfileStore;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Attribute, Cell};
use tracing::{debug, warn};

/// Computes, records and displays one day's fortune.
pub async fn run<S: ProfileStore>(
    config: &AppConfig,
    manager: &mut ProfileManager<S>,
    personality: PersonalityType,
    date: NaiveDate,
    narrator: Option<&dyn Narrator>,
) -> Result<()> {
    let result = config.engine().compute(personality.code(), date, config);
    debug!(%personality, %date, score = result.overall.score, "Computed fortune");

    let unlocked = match manager.record(personality, &result, date) {
        Ok(unlocked) => unlocked,
        Err(e) => {
            warn!(error = %e, "Fortune was not persisted");
            Vec::new()
        }
    };

    let narration = match narrator {
        Some(narrator) => narrate(narrator, personality, date, &result).await,
        None => None,
    };
    let profile = config.type_profile(personality);
    let texts = resolve_texts(profile, narration);

    display_fortune(personality, profile, date, &result, &texts);
    display_unlocked(&unlocked);
    Ok(())
}

async fn narrate(
    narrator: &dyn Narrator,
    personality: PersonalityType,
    date: NaiveDate,
    result: &FortuneResult,
) -> Option<Narration> {
    let pb = ui::new_spinner("Writing your personal fortune...");
    let narration = narrator.narrate(personality, date, result).await;
    pb.finish_and_clear();

    match narration {
        Ok(narration) => Some(narration),
        Err(e) => {
            warn!(error = %e, "Narration failed, using configured texts");
            None
        }
    }
}

/// Generated texts win over configured ones; a type missing from the
/// config with no narration gets empty texts.
fn resolve_texts(profile: Option<&TypeProfile>, narration: Option<Narration>) -> Narration {
    narration.unwrap_or_else(|| Narration {
        love: profile.map(|p| p.love.clone()).unwrap_or_default(),
        work: profile.map(|p| p.work.clone()).unwrap_or_default(),
        tip: profile.map(|p| p.tip.clone()).unwrap_or_default(),
    })
}

fn display_fortune(
    personality: PersonalityType,
    profile: Option<&TypeProfile>,
    date: NaiveDate,
    result: &FortuneResult,
    texts: &Narration,
) {
    let heading = match profile {
        Some(p) if !p.emoji.is_empty() => format!("{} {} · {}", p.emoji, personality, p.title),
        Some(p) => format!("{} · {}", personality, p.title),
        None => personality.to_string(),
    };
    println!(
        "\n{}  {}",
        ui::style_text(&heading, ui::StyleType::Title),
        ui::style_text(&date.to_string(), ui::StyleType::Subtle)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Dimension"),
        ui::header_cell("Score"),
        ui::header_cell("Rating"),
        ui::header_cell("Today"),
    ]);

    let overall = &result.overall;
    table.add_row(vec![
        Cell::new("Overall").add_attribute(Attribute::Bold),
        ui::score_cell(overall.score).add_attribute(Attribute::Bold),
        ui::stars_cell(overall.score),
        ui::level_cell(overall.level),
    ]);

    for dimension in Dimension::ALL {
        let Some(fortune) = result.dimensions.get(&dimension) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(ui::capitalize(dimension.name())),
            ui::score_cell(fortune.score),
            ui::stars_cell(fortune.score),
            Cell::new(fortune.events.join("; ")),
        ]);
    }
    println!("{table}");
    println!(
        "{} {}",
        ui::style_text("Trend:", ui::StyleType::Label),
        overall.trend
    );

    println!();
    for (label, text) in [("Love", &texts.love), ("Work", &texts.work), ("Tip", &texts.tip)] {
        if !text.is_empty() {
            println!("{} {}", ui::style_text(&format!("{label}:"), ui::StyleType::Label), text);
        }
    }
    if let Some(p) = profile {
        println!(
            "{} {}   {} {}",
            ui::style_text("Lucky color:", ui::StyleType::Label),
            p.lucky_color,
            ui::style_text("Lucky item:", ui::StyleType::Label),
            p.lucky_item
        );
    }
}

fn display_unlocked(unlocked: &[Achievement]) {
    for achievement in unlocked {
        println!(
            "\n🏆 {} {}",
            ui::style_text(achievement.name(), ui::StyleType::Highlight),
            ui::style_text(achievement.description(), ui::StyleType::Subtle)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EXAMPLE_CONFIG;
    use crate::store::MemoryStore;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct FixedNarrator;

    #[async_trait]
    impl Narrator for FixedNarrator {
        async fn narrate(
            &self,
            _personality: PersonalityType,
            _date: NaiveDate,
            _fortune: &FortuneResult,
        ) -> Result<Narration> {
            Ok(Narration {
                love: "generated love".to_string(),
                work: "generated work".to_string(),
                tip: "generated tip".to_string(),
            })
        }
    }

    struct BrokenNarrator;

    #[async_trait]
    impl Narrator for BrokenNarrator {
        async fn narrate(
            &self,
            _personality: PersonalityType,
            _date: NaiveDate,
            _fortune: &FortuneResult,
        ) -> Result<Narration> {
            Err(anyhow!("quota exceeded"))
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_resolve_texts_prefers_narration() {
        let config = AppConfig::from_yaml(EXAMPLE_CONFIG).unwrap();
        let profile = config.type_profile(PersonalityType::Intj);

        let fallback = resolve_texts(profile, None);
        assert_eq!(fallback.love, profile.unwrap().love);
        assert_eq!(fallback.tip, profile.unwrap().tip);

        let narrated = resolve_texts(
            profile,
            Some(Narration {
                love: "a".to_string(),
                work: "b".to_string(),
                tip: "c".to_string(),
            }),
        );
        assert_eq!(narrated.work, "b");

        let missing = resolve_texts(None, None);
        assert!(missing.love.is_empty());
    }

    #[tokio::test]
    async fn test_narration_outcome_does_not_affect_recording() {
        let config = AppConfig::from_yaml(EXAMPLE_CONFIG).unwrap();
        let store = MemoryStore::new();
        let mut manager = ProfileManager::load(&store, &config.profile_key);

        let fixed: &dyn Narrator = &FixedNarrator;
        let broken: &dyn Narrator = &BrokenNarrator;
        run(&config, &mut manager, PersonalityType::Intj, date(), Some(fixed))
            .await
            .unwrap();
        run(&config, &mut manager, PersonalityType::Intj, date(), Some(broken))
            .await
            .unwrap();

        let profile = manager.profile();
        assert_eq!(profile.history.len(), 1);
        assert_eq!(profile.history[0].query_count, 2);
        assert_eq!(profile.history[0].fortune.overall.score, 3.4);
        assert_eq!(profile.statistics.total_queries, 2);
    }

    #[tokio::test]
    async fn test_narrate_falls_back_on_error() {
        let config = AppConfig::from_yaml(EXAMPLE_CONFIG).unwrap();
        let result = config.engine().compute("INTJ", date(), &config);

        let narration = narrate(&BrokenNarrator, PersonalityType::Intj, date(), &result).await;
        assert!(narration.is_none());

        let narration = narrate(&FixedNarrator, PersonalityType::Intj, date(), &result).await;
        assert_eq!(narration.unwrap().tip, "generated tip");
    }
}
