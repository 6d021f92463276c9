use crate::models::BetResult;

/// Dollar outcome of a settled bet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payout {
    pub payout: f64,
    pub profit_loss: f64,
}

/// American odds are never inside (-100, +100)
pub fn is_valid_american_odds(odds: i32) -> bool {
    odds >= 100 || odds <= -100
}

/// Total returned on a winning bet, stake included
pub fn win_payout(stake: f64, odds: i32) -> f64 {
    if odds > 0 {
        stake * (odds as f64 / 100.0) + stake
    } else {
        stake * (100.0 / odds.abs() as f64) + stake
    }
}

/// Payout and profit for a graded result. Pending bets carry nothing.
pub fn settle_amounts(result: BetResult, stake: f64, odds: i32) -> Payout {
    let (payout, profit_loss) = match result {
        BetResult::Win => {
            let payout = round_cents(win_payout(stake, odds));
            (payout, round_cents(payout - stake))
        }
        BetResult::Push => (stake, 0.0),
        BetResult::Loss => (0.0, -stake),
        BetResult::Pending => (0.0, 0.0),
    };
    Payout {
        payout,
        profit_loss,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
