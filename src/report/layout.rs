use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::game::{rank_players, RoundResult};

pub const REPORT_TITLE: &str = "Game Score Record";
pub const RANKING_TITLE: &str = "Final Ranking";
/// Appended to the first ranking line
pub const CHAMPION_MARK: &str = " (W)";

#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub text: String,
    pub is_winner: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub label: String,
    pub cells: Vec<SheetCell>,
}

/// Everything the scorecard shows, already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheet {
    pub title: String,
    pub summary: String,
    pub header: Vec<String>,
    pub rounds: Vec<SheetRow>,
    pub totals: SheetRow,
    pub ranking: Vec<String>,
    pub generated_at: String,
}

impl ScoreSheet {
    pub fn build(
        roster: &[String],
        history: &[RoundResult],
        totals: &BTreeMap<String, f64>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let header = std::iter::once("Round".to_string())
            .chain(roster.iter().cloned())
            .collect();

        let rounds = history
            .iter()
            .enumerate()
            .map(|(index, round)| SheetRow {
                label: format!("Round {}", index + 1),
                cells: roster
                    .iter()
                    .map(|player| {
                        let score = format_score(round.score(player).unwrap_or_default());
                        let is_winner = *player == round.winner;
                        SheetCell {
                            text: if is_winner {
                                format!("{} (W)", score)
                            } else {
                                score
                            },
                            is_winner,
                        }
                    })
                    .collect(),
            })
            .collect();

        let totals_row = SheetRow {
            label: "Total".to_string(),
            cells: roster
                .iter()
                .map(|player| SheetCell {
                    text: format_score(totals.get(player).copied().unwrap_or_default()),
                    is_winner: false,
                })
                .collect(),
        };

        let ranking = rank_players(roster, totals)
            .into_iter()
            .enumerate()
            .map(|(index, player)| {
                let line = format!("{}. {}: {}", index + 1, player.name, format_score(player.total));
                if index == 0 {
                    line + CHAMPION_MARK
                } else {
                    line
                }
            })
            .collect();

        Self {
            title: REPORT_TITLE.to_string(),
            summary: format!("Players: {} | Rounds: {}", roster.len(), history.len()),
            header,
            rounds,
            totals: totals_row,
            ranking,
            generated_at: format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        }
    }

    /// Header, round rows and totals row, top to bottom
    pub fn table_rows(&self) -> Vec<(&str, Vec<&SheetCell>)> {
        self.rounds
            .iter()
            .chain(std::iter::once(&self.totals))
            .map(|row| (row.label.as_str(), row.cells.iter().collect()))
            .collect()
    }
}

/// Two decimals, with negative zero shown as 0.00
pub fn format_score(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn two_round_game() -> GameState {
        let roster: Vec<String> = ["Alice", "Bob", "Carol"].iter().map(|s| s.to_string()).collect();
        let mut game = GameState::new();
        game.start(&roster).unwrap();

        let round1: HashMap<String, f64> =
            [("Bob".to_string(), -3.0), ("Carol".to_string(), -2.0)].into();
        let round2: HashMap<String, f64> =
            [("Alice".to_string(), -1.0), ("Carol".to_string(), -4.0)].into();
        game.record_round("Alice", &round1).unwrap();
        game.record_round("Bob", &round2).unwrap();
        game
    }

    #[test]
    fn test_sheet_for_two_round_game() {
        let game = two_round_game();
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap();
        let sheet = ScoreSheet::build(game.roster(), game.history(), game.totals(), at);

        assert_eq!(sheet.summary, "Players: 3 | Rounds: 2");
        assert_eq!(sheet.header, vec!["Round", "Alice", "Bob", "Carol"]);
        assert_eq!(sheet.rounds.len(), 2);

        let first: Vec<&str> = sheet.rounds[0].cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(first, vec!["5.00 (W)", "-3.00", "-2.00"]);
        assert!(sheet.rounds[1].cells[1].is_winner);
        assert_eq!(sheet.rounds[1].cells[1].text, "5.00 (W)");

        let totals: Vec<&str> = sheet.totals.cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(totals, vec!["4.00", "2.00", "-6.00"]);

        assert_eq!(
            sheet.ranking,
            vec!["1. Alice: 4.00 (W)", "2. Bob: 2.00", "3. Carol: -6.00"]
        );
        assert_eq!(sheet.generated_at, "Generated: 2026-10-19 12:30:00 UTC");
        assert_eq!(sheet.table_rows().len(), 3);
    }

    #[test]
    fn test_empty_game_still_has_totals_row() {
        let roster = vec!["Solo".to_string()];
        let totals: BTreeMap<String, f64> = [("Solo".to_string(), 0.0)].into();
        let sheet = ScoreSheet::build(&roster, &[], &totals, Utc::now());

        assert!(sheet.rounds.is_empty());
        assert_eq!(sheet.totals.cells[0].text, "0.00");
        assert_eq!(sheet.ranking, vec!["1. Solo: 0.00 (W)"]);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(-0.0), "0.00");
        assert_eq!(format_score(12.345678), "12.35");
        assert_eq!(format_score(-12.5), "-12.50");
    }
}
