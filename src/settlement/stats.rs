use crate::models::BetResult;
use crate::store::Ledger;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Performance of the picks on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_picks: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
    /// Wins plus losses; pushes are not decisions
    pub settled_bets: usize,
    /// Percentage of decisions won
    pub accuracy: f64,
    pub unit_value: f64,
    pub profit_loss_units: f64,
    pub profit_loss_dollars: f64,
    pub total_wagered_units: f64,
    pub total_wagered_dollars: f64,
    /// Profit as a percentage of dollars wagered
    pub roi: f64,
}

impl DailyStats {
    /// Format for display
    pub fn format(&self) -> String {
        format!(
            "{} | {}-{}-{} ({} picks) | Accuracy: {:.1}% | P&L: ${:+.2} ({:+.2}u) | Wagered: ${:.2} ({:.2}u) | ROI: {:+.1}%",
            self.date,
            self.wins,
            self.losses,
            self.pushes,
            self.total_picks,
            self.accuracy,
            self.profit_loss_dollars,
            self.profit_loss_units,
            self.total_wagered_dollars,
            self.total_wagered_units,
            self.roi
        )
    }
}

/// Dollar value of one unit: the configured value, else the first pick that
/// carries both units and dollars, else 1.0
fn infer_unit_value(configured: Option<f64>, stakes: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    if let Some(value) = configured.filter(|v| *v > 0.0) {
        return value;
    }
    stakes
        .into_iter()
        .find(|(units, dollars)| *units > 0.0 && *dollars > 0.0)
        .map(|(units, dollars)| dollars / units)
        .unwrap_or(1.0)
}

pub fn daily_stats(ledger: &Ledger, date: NaiveDate, unit_value: Option<f64>) -> DailyStats {
    let picks = ledger.picks_for_date(date);
    let unit_value = infer_unit_value(
        unit_value,
        picks.iter().map(|p| (p.stake_units, p.stake_amount)),
    );

    let mut stats = DailyStats {
        date,
        total_picks: picks.len(),
        wins: 0,
        losses: 0,
        pushes: 0,
        settled_bets: 0,
        accuracy: 0.0,
        unit_value,
        profit_loss_units: 0.0,
        profit_loss_dollars: 0.0,
        total_wagered_units: 0.0,
        total_wagered_dollars: 0.0,
        roi: 0.0,
    };

    for pick in &picks {
        stats.total_wagered_units += pick.stake_units;
        stats.total_wagered_dollars += pick.stake_amount;

        let Some(bet) = ledger.bet(pick.id) else {
            continue;
        };
        match bet.result {
            BetResult::Win => stats.wins += 1,
            BetResult::Loss => stats.losses += 1,
            BetResult::Push => stats.pushes += 1,
            BetResult::Pending => continue,
        }
        stats.profit_loss_dollars += bet.profit_loss;
        stats.profit_loss_units += bet.profit_loss / unit_value;
    }

    stats.settled_bets = stats.wins + stats.losses;
    if stats.settled_bets > 0 {
        stats.accuracy = stats.wins as f64 / stats.settled_bets as f64 * 100.0;
    }
    if stats.total_wagered_dollars > 0.0 {
        stats.roi = stats.profit_loss_dollars / stats.total_wagered_dollars * 100.0;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BetType, GameId, Pick, PickId};
    use chrono::{TimeZone, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn pick(id: i64, game: i64, units: f64, dollars: f64) -> Pick {
        Pick {
            id: PickId(id),
            game_id: GameId(game),
            bet_type: BetType::Moneyline,
            line: 0.0,
            odds: -110,
            team_id: None,
            book: "fanduel".to_string(),
            stake_units: units,
            stake_amount: dollars,
            rationale: String::new(),
            selection_text: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn settle(ledger: &mut Ledger, id: i64, result: BetResult, profit: f64) {
        if let Some(bet) = ledger.bet_entry(PickId(id)) {
            bet.result = result;
            bet.profit_loss = profit;
        }
    }

    #[test]
    fn test_unit_value_inference() {
        assert_eq!(infer_unit_value(Some(25.0), vec![(2.0, 100.0)]), 25.0);
        assert_eq!(infer_unit_value(None, vec![(0.0, 10.0), (2.0, 100.0)]), 50.0);
        assert_eq!(infer_unit_value(None, Vec::new()), 1.0);
    }

    #[test]
    fn test_daily_stats() {
        let mut ledger = Ledger::new();
        let teams = [("Duke", "UNC"), ("Gonzaga", "Kentucky"), ("Purdue", "Iowa"), ("Houston", "Baylor")];
        for (i, (a, b)) in teams.iter().enumerate() {
            ledger
                .add_game_by_names(GameId(i as i64 + 1), a, b, day())
                .unwrap();
            ledger
                .insert_pick(pick(i as i64 + 1, i as i64 + 1, 1.0, 10.0))
                .unwrap();
        }
        settle(&mut ledger, 1, BetResult::Win, 9.09);
        settle(&mut ledger, 2, BetResult::Loss, -10.0);
        settle(&mut ledger, 3, BetResult::Push, 0.0);
        // pick 4 stays pending

        let stats = daily_stats(&ledger, day(), None);
        assert_eq!(stats.total_picks, 4);
        assert_eq!((stats.wins, stats.losses, stats.pushes), (1, 1, 1));
        assert_eq!(stats.settled_bets, 2);
        assert!((stats.accuracy - 50.0).abs() < 1e-9);
        assert!((stats.profit_loss_dollars - -0.91).abs() < 1e-9);
        assert!((stats.profit_loss_units - -0.091).abs() < 1e-9);
        assert!((stats.total_wagered_dollars - 40.0).abs() < 1e-9);
        assert!((stats.roi - (-0.91 / 40.0 * 100.0)).abs() < 1e-9);
        assert!(stats.format().contains("1-1-1 (4 picks)"));
    }

    #[test]
    fn test_empty_day() {
        let ledger = Ledger::new();
        let stats = daily_stats(&ledger, day(), None);
        assert_eq!(stats.total_picks, 0);
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.roi, 0.0);
    }
}
