//! Terminal rendering of the transcript and the scenario comparison chart.

use chrono::Local;
use colored::*;
use std::fmt::Write as _;

use crate::models::{ChatMessage, Role, ScenarioPoint, WinningScenario};
use crate::session::SessionState;

const BAR_WIDTH: usize = 32;

pub fn render_message(msg: &ChatMessage) -> String {
    let label = match msg.role {
        Role::User => "BAŞ MÜHENDİS".cyan().bold(),
        Role::Model => "NEXUS AI".green().bold(),
    };
    let time = msg.timestamp.with_timezone(&Local).format("%H:%M:%S");
    format!("{} {}\n{}\n", label, time.to_string().dimmed(), msg.content)
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.min(BAR_WIDTH))
}

fn value_or_dash(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Quality vs cost bars for every scenario, the customer target line, and the
/// recommended scenario underneath.
pub fn render_chart(
    data: &[ScenarioPoint],
    winner: Option<&WinningScenario>,
    target_cmt: f64,
) -> String {
    if data.is_empty() {
        return format!(
            "{}\n{}\n",
            "SİMÜLASYON VERİSİ BEKLENİYOR...".dimmed(),
            "Fine-Tuning Modülü Hazır.".dimmed()
        );
    }

    let cmt_max = data.iter().filter_map(|p| p.cmt).fold(target_cmt, f64::max);
    let cost_max = data.iter().filter_map(|p| p.cost).fold(0.0, f64::max);
    let name_width = data
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}",
        "KARAR MATRİSİ: KALİTE vs MALİYET".cyan().bold(),
        format!("HEDEF: {target_cmt} N").yellow()
    );

    let target_col = bar(target_cmt, cmt_max).chars().count();
    for point in data {
        let marker = match point.cmt {
            Some(cmt) if cmt < target_cmt => "▼".red(),
            Some(_) => "▲".green(),
            None => "".normal(),
        };
        let _ = writeln!(
            out,
            "{:<width$}  CMT     {:<bar_w$} {} {} | Risk {}",
            point.name,
            bar(point.cmt.unwrap_or(0.0), cmt_max).green(),
            value_or_dash(point.cmt),
            marker,
            value_or_dash(point.risk),
            width = name_width,
            bar_w = BAR_WIDTH,
        );
        let _ = writeln!(
            out,
            "{:<width$}  Maliyet {:<bar_w$} {}",
            "",
            bar(point.cost.unwrap_or(0.0), cost_max).yellow(),
            value_or_dash(point.cost),
            width = name_width,
            bar_w = BAR_WIDTH,
        );
    }
    let _ = writeln!(
        out,
        "{:<width$}  {}{}",
        "",
        " ".repeat(8 + target_col.saturating_sub(1)),
        "┆ MÜŞTERİ HEDEFİ".red(),
        width = name_width,
    );

    if let Some(winner) = winner {
        let _ = writeln!(out, "{}", format!("NEXUS ÖNERİSİ: {}", winner.name).green().bold());
        let _ = writeln!(out, "  {}", winner.reason);
        let _ = writeln!(out, "  [{}]", winner.improvement.green());
    }

    out
}

/// Full transcript with the chart attached under the newest reply when visible
pub fn render_transcript(state: &SessionState) -> String {
    let mut out = String::new();
    for msg in &state.messages {
        out.push_str(&render_message(msg));
        out.push('\n');
    }
    if state.chart_visible() {
        out.push_str(&render_chart(
            &state.chart_data,
            state.winning_scenario.as_ref(),
            state.telemetry.target_cmt,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, cmt: f64, cost: f64, risk: f64) -> ScenarioPoint {
        ScenarioPoint {
            name: name.to_string(),
            cmt: Some(cmt),
            cost: Some(cost),
            risk: Some(risk),
        }
    }

    #[test]
    fn test_empty_chart_shows_waiting_notice() {
        let out = render_chart(&[], None, 180.0);
        assert!(out.contains("SİMÜLASYON VERİSİ BEKLENİYOR..."));
    }

    #[test]
    fn test_chart_lists_every_scenario_and_target() {
        let data = vec![
            point("Mevcut", 170.0, 100.0, 10.0),
            point("NEXUS (Hibrit)", 186.0, 96.0, 18.0),
        ];
        let out = render_chart(&data, None, 180.0);
        assert!(out.contains("Mevcut"));
        assert!(out.contains("NEXUS (Hibrit)"));
        assert!(out.contains("HEDEF: 180 N"));
        assert!(out.contains("MÜŞTERİ HEDEFİ"));
        assert!(!out.contains("NEXUS ÖNERİSİ"));
    }

    #[test]
    fn test_chart_includes_winning_scenario() {
        let winner = WinningScenario {
            name: "NEXUS (Hibrit)".to_string(),
            reason: "Daha yüksek CMT, düşük maliyet".to_string(),
            improvement: "CMT +9% | Cost -4%".to_string(),
        };
        let out = render_chart(&[point("NEXUS (Hibrit)", 186.0, 96.0, 18.0)], Some(&winner), 180.0);
        assert!(out.contains("NEXUS ÖNERİSİ: NEXUS (Hibrit)"));
        assert!(out.contains("CMT +9% | Cost -4%"));
    }

    #[test]
    fn test_chart_marks_scenarios_against_target() {
        colored::control::set_override(false);
        let data = vec![
            point("Mevcut", 170.0, 100.0, 10.0),
            point("NEXUS (Hibrit)", 186.0, 96.0, 18.0),
        ];
        let out = render_chart(&data, None, 180.0);
        assert!(out.contains("170 ▼ | Risk 10"));
        assert!(out.contains("186 ▲ | Risk 18"));
    }

    #[test]
    fn test_chart_shows_dash_for_missing_values() {
        colored::control::set_override(false);
        let data = vec![ScenarioPoint {
            name: "Senaryo A".to_string(),
            cmt: Some(175.0),
            cost: None,
            risk: None,
        }];
        let out = render_chart(&data, None, 180.0);
        assert!(out.contains("175 ▼ | Risk -"));
        assert!(out.contains("Maliyet"));
        assert!(out.trim_end().lines().any(|l| l.trim_end().ends_with('-')));
    }

    #[test]
    fn test_bar_scales_to_maximum() {
        assert_eq!(bar(100.0, 100.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(50.0, 100.0).chars().count(), BAR_WIDTH / 2);
        assert!(bar(-5.0, 100.0).is_empty());
        assert!(bar(5.0, 0.0).is_empty());
    }

    #[test]
    fn test_transcript_hides_chart_before_first_reply() {
        let state = SessionState::default();
        let out = render_transcript(&state);
        assert!(out.contains("NEXUS AI"));
        assert!(!out.contains("KARAR MATRİSİ"));
    }
}
