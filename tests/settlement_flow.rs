use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use team_settlement::settlement::{
    daily_stats, pending_picks, record_result, settle_date, SkipCategory,
};
use team_settlement::{
    settle_snapshot, BetResult, BetType, Config, GameId, Ledger, Pick, PickId, ResultPayload,
    TeamId, TeamRegistry,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()
}

fn pick(id: i64, game: i64, bet_type: BetType, line: f64, odds: i32, team: Option<TeamId>) -> Pick {
    Pick {
        id: PickId(id),
        game_id: GameId(game),
        bet_type,
        line,
        odds,
        team_id: team,
        book: "draftkings".to_string(),
        stake_units: 1.0,
        stake_amount: 10.0,
        rationale: String::new(),
        selection_text: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 8, 14, 0, 0).unwrap(),
    }
}

/// Three games from different sources: storage order and payload order disagree on two
fn build_ledger() -> Ledger {
    let mut ledger = Ledger::new();
    ledger
        .add_game_by_names(GameId(1), "Duke Blue Devils", "North Carolina Tar Heels", day())
        .unwrap();
    ledger
        .add_game_by_names(GameId(2), "Michigan State Spartans", "Michigan Wolverines", day())
        .unwrap();
    ledger
        .add_game_by_names(GameId(3), "Miami (OH) RedHawks", "Miami Hurricanes", day())
        .unwrap();
    ledger
}

#[test]
fn test_full_settlement_flow() {
    let mut ledger = build_ledger();
    let registry = ledger.registry();
    let duke = registry.find("Duke").unwrap();
    let unc = registry.find("UNC").unwrap();
    let michigan = registry.find("Michigan").unwrap();
    let michigan_st = registry.find("Michigan St.").unwrap();
    let miami_oh = registry.find("Miami (Ohio)").unwrap();
    let miami_fl = registry.find("Miami (FL)").unwrap();
    assert_eq!(registry.len(), 6);
    assert_ne!(duke, unc);
    assert_ne!(michigan, michigan_st);
    assert_ne!(miami_oh, miami_fl);
    assert!(registry.audit().is_empty());

    // Payload lists UNC at home, reversed from storage order (Duke, UNC)
    record_result(
        &mut ledger,
        GameId(1),
        ResultPayload {
            home_score: Some(80),
            away_score: Some(72),
            home_team: Some("North Carolina".to_string()),
            away_team: Some("Duke".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    // Ids from the scoreboard: Michigan home
    record_result(
        &mut ledger,
        GameId(2),
        ResultPayload {
            home_score: Some(70),
            away_score: Some(75),
            home_team_id: Some(michigan),
            away_team_id: Some(michigan_st),
            ..Default::default()
        },
    )
    .unwrap();
    // No labels at all: must not be guessed
    record_result(
        &mut ledger,
        GameId(3),
        ResultPayload {
            home_score: Some(60),
            away_score: Some(58),
            ..Default::default()
        },
    )
    .unwrap();

    // Duke +7.5 lost by 8
    ledger
        .insert_pick(pick(1, 1, BetType::Spread, 7.5, -110, Some(duke)))
        .unwrap();
    // Michigan St moneyline +150 won 75-70
    ledger
        .insert_pick(pick(2, 2, BetType::Moneyline, 0.0, 150, Some(michigan_st)))
        .unwrap();
    ledger
        .insert_pick(pick(3, 3, BetType::Moneyline, 0.0, -120, Some(miami_fl)))
        .unwrap();

    let report = settle_date(&mut ledger, day(), Utc::now());
    assert_eq!(report.picks_considered, 3);
    assert_eq!(report.newly_settled, 2);
    assert_eq!(
        report.counts_by_category().get(&SkipCategory::Unresolved),
        Some(&1)
    );

    let duke_bet = ledger.bet(PickId(1)).unwrap();
    assert_eq!(duke_bet.result, BetResult::Loss);
    assert_eq!(duke_bet.profit_loss, -10.0);
    let msu_bet = ledger.bet(PickId(2)).unwrap();
    assert_eq!(msu_bet.result, BetResult::Win);
    assert!((msu_bet.payout - 25.0).abs() < 1e-9);
    assert_eq!(ledger.bet(PickId(3)).unwrap().result, BetResult::Pending);
    assert_eq!(pending_picks(&ledger, day()), vec![PickId(3)]);

    // Re-run: same grades, no new rows
    let report = settle_date(&mut ledger, day(), Utc::now());
    assert_eq!(report.re_settled, 2);
    assert_eq!(report.changed, 0);
    assert_eq!(ledger.bets().count(), 3);

    let stats = daily_stats(&ledger, day(), None);
    assert_eq!((stats.wins, stats.losses, stats.pushes), (1, 1, 0));
    assert!((stats.profit_loss_dollars - 5.0).abs() < 1e-9);
    assert!((stats.accuracy - 50.0).abs() < 1e-9);
}

#[test]
fn test_concurrent_discovery_across_games() {
    let registry = Arc::new(TeamRegistry::new());
    let spellings = [
        "Penn State",
        "Penn St.",
        "Penn State Nittany Lions",
        "PENN STATE",
    ];

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let name = spellings[i % spellings.len()];
            std::thread::spawn(move || registry.resolve(name, "Ohio State").unwrap())
        })
        .collect();
    let ids: Vec<TeamId> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.canonical_name(ids[0]).as_deref(), Some("penn st"));
}

#[tokio::test]
async fn test_snapshot_run_round_trip() {
    let mut ledger = build_ledger();
    let unc = ledger.registry().find("North Carolina").unwrap();
    record_result(
        &mut ledger,
        GameId(1),
        ResultPayload {
            home_score: Some(80),
            away_score: Some(72),
            home_team: Some("UNC".to_string()),
            away_team: Some("Duke".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    ledger
        .insert_pick(pick(1, 1, BetType::Spread, -3.5, -110, Some(unc)))
        .unwrap();

    let dir = std::env::temp_dir().join(format!("settlement-flow-{}", std::process::id()));
    let path = dir.join("ledger.json");
    ledger.save(&path).unwrap();

    let config = Config {
        snapshot_path: path.clone(),
        parallel: true,
        unit_value: Some(10.0),
        ..Config::default()
    };
    let run = settle_snapshot(&config, day()).await.unwrap();
    assert_eq!(run.report.newly_settled, 1);
    assert!((run.stats.profit_loss_units - 0.909).abs() < 1e-9);
    assert!(run.pending.is_empty());

    let reloaded = Ledger::load(&path).unwrap();
    std::fs::remove_dir_all(&dir).ok();
    assert_eq!(reloaded.bet(PickId(1)).unwrap().result, BetResult::Win);
}
