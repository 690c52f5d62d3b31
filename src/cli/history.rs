use super::ui;
use crate::core::fortune::Dimension;
use crate::core::history::TrendSummary;
use crate::core::profile::{Achievement, DayScore, UserProfile};
use comfy_table::{Cell, CellAlignment, Color};

/// Displays the trend, per-dimension analysis, suggestions, statistics and
/// achievements of the stored profile.
pub fn run(profile: &UserProfile, window_days: usize) {
    if profile.history.is_empty() {
        println!("No fortunes recorded yet. Run `typefortune fortune <TYPE>` first.");
        return;
    }

    println!(
        "\n{}",
        ui::style_text(
            &format!("Fortune history (last {window_days} days)"),
            ui::StyleType::Title
        )
    );
    println!("{}", describe_trend(&profile.trend(window_days)));

    display_dimensions(profile);
    display_suggestions(profile);
    ui::print_separator();
    display_statistics(profile);
    display_achievements(profile);
}

fn describe_trend(summary: &TrendSummary) -> String {
    match summary.average {
        Some(average) => format!(
            "{} {:?} ({:+.1} over {} days, average {:.1})",
            ui::style_text("Trend:", ui::StyleType::Label),
            summary.trend,
            summary.change,
            summary.data_points,
            average
        ),
        None => format!(
            "{} not enough data yet ({} recorded)",
            ui::style_text("Trend:", ui::StyleType::Label),
            summary.data_points
        ),
    }
}

fn display_dimensions(profile: &UserProfile) {
    let Some(analysis) = profile.dimension_analysis() else {
        return;
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Dimension"),
        ui::header_cell("Average"),
        ui::header_cell("Best"),
        ui::header_cell("Worst"),
        ui::header_cell("Trend"),
    ]);
    for dimension in Dimension::ALL {
        let Some(stats) = analysis.get(&dimension) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(ui::capitalize(dimension.name())),
            ui::score_cell(stats.average),
            ui::score_cell(stats.best),
            ui::score_cell(stats.worst),
            ui::trend_cell(stats.trend.into()),
        ]);
    }
    println!("{table}");
}

fn display_suggestions(profile: &UserProfile) {
    let suggestions = profile.suggestions();
    if suggestions.is_empty() {
        return;
    }
    println!("\n{}", ui::style_text("Suggestions", ui::StyleType::Label));
    for suggestion in suggestions {
        println!("  • {}", suggestion.message());
    }
}

fn day_score_text(day: DayScore) -> String {
    format!("{} ({:.1})", day.date, day.score)
}

fn display_statistics(profile: &UserProfile) {
    let stats = &profile.statistics;
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Statistic"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Total queries"),
        Cell::new(stats.total_queries).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Average fortune"),
        ui::score_cell(stats.average_fortune),
    ]);
    table.add_row(vec![
        Cell::new("Best day"),
        ui::format_optional_cell(stats.best_day, day_score_text),
    ]);
    table.add_row(vec![
        Cell::new("Worst day"),
        ui::format_optional_cell(stats.worst_day, day_score_text),
    ]);
    table.add_row(vec![
        Cell::new("Streak"),
        Cell::new(format!("{} days", stats.streak_days)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Last query"),
        ui::format_optional_cell(stats.last_query_date, |d| d.to_string()),
    ]);
    println!("{table}");
}

fn display_achievements(profile: &UserProfile) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Achievement"),
        ui::header_cell("Description"),
        ui::header_cell("Unlocked"),
    ]);
    for achievement in Achievement::ALL {
        let unlocked = profile
            .achievements
            .iter()
            .find(|a| a.id == achievement)
            .map(|a| a.unlocked_on);
        let status = match unlocked {
            Some(date) => Cell::new(format!("✔ {date}")).fg(Color::Green),
            None => Cell::new("locked").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(achievement.name()),
            Cell::new(achievement.description()),
            status,
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fortune::FortuneEngine;
    use crate::core::history::HistoryTrend;
    use crate::core::personality::PersonalityType;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn test_describe_trend() {
        let summary = TrendSummary {
            trend: HistoryTrend::Rising,
            change: 0.8,
            average: Some(3.75),
            data_points: 7,
        };
        let text = describe_trend(&summary);
        assert!(text.contains("Rising"));
        assert!(text.contains("+0.8 over 7 days"));

        let summary = TrendSummary {
            trend: HistoryTrend::InsufficientData,
            change: 0.0,
            average: None,
            data_points: 1,
        };
        assert!(describe_trend(&summary).contains("not enough data"));
    }

    #[test]
    fn test_run_handles_empty_and_populated_profiles() {
        let mut profile = UserProfile::default();
        run(&profile, 7);

        let bases = HashMap::from([("ENFP".to_string(), 4.0)]);
        let engine = FortuneEngine::new();
        for d in 1..=8 {
            let date = NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
            let fortune = engine.compute("ENFP", date, &bases);
            profile.record_fortune_query(PersonalityType::Enfp, &fortune, date);
        }
        assert!(profile.has_achievement(Achievement::WeekStreak));
        run(&profile, 7);
    }
}
