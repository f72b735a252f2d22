//! Tests for cross-attempt aggregation
//!
//! Builds `FightComparison`s by hand and checks the folded report.

use super::{BossFilter, summarize};
use crate::config::AnalysisConfig;
use crate::session::AttemptInfo;
use wipecall_types::{BossComparison, DeathAnalysis, DeathEvent, FightComparison};

fn death(player: &str, ability: &str, time_secs: f64) -> DeathEvent {
    DeathEvent {
        timestamp: (time_secs * 1000.0) as i64,
        player_name: player.to_string(),
        player_id: player.len() as i64,
        killing_ability: ability.to_string(),
        killing_ability_id: None,
        killing_source: Some("Boss".to_string()),
        fight_time_secs: time_secs,
        is_after_wipe_call: false,
    }
}

fn after_wipe(mut death: DeathEvent) -> DeathEvent {
    death.is_after_wipe_call = true;
    death
}

/// Attempt with pre-classified deaths
fn fight(
    session: &str,
    attempt_number: u32,
    kill: bool,
    duration_secs: f64,
    deaths: Vec<DeathEvent>,
) -> FightComparison {
    let after = deaths.iter().filter(|d| d.is_after_wipe_call).count() as u32;
    let wipe_call_secs = deaths
        .iter()
        .find(|d| d.is_after_wipe_call)
        .map(|d| d.fight_time_secs - 1.0);
    FightComparison {
        session_id: session.to_string(),
        session_date: format!("2025-01-0{}", session.len()),
        attempt_id: attempt_number as i64 * 10,
        attempt_number,
        duration_secs,
        kill,
        fight_percentage: if kill { None } else { Some(40.0) },
        roster: None,
        death_analysis: DeathAnalysis {
            attempt_id: attempt_number as i64 * 10,
            attempt_name: "Forgeweaver Araz".to_string(),
            total_deaths: deaths.len() as u32,
            deaths_before_wipe: deaths.len() as u32 - after,
            deaths_after_wipe: after,
            wipe_call_secs,
            deaths,
        },
    }
}

fn run(comparisons: Vec<FightComparison>) -> BossComparison {
    summarize(
        &BossFilter::new("Araz", Some(5)),
        comparisons,
        &AnalysisConfig::default(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Rankings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_player_and_ability_ranking() {
    let report = run(vec![
        fight("n1", 1, false, 120.0, vec![death("A", "X", 20.0)]),
        fight(
            "n1",
            2,
            false,
            120.0,
            vec![death("B", "X", 30.0), death("B", "Y", 70.0)],
        ),
    ]);
    let fail = &report.fail_analysis;

    let x = &fail.ability_ranking[0];
    assert_eq!(x.ability_name, "X");
    assert_eq!(x.total_kills, 2);
    assert_eq!(x.player_victims.get("A"), Some(&1));
    assert_eq!(x.player_victims.get("B"), Some(&1));
    assert_eq!(x.average_kill_time, 25.0);

    assert_eq!(fail.player_ranking[0].player_name, "B");
    assert_eq!(fail.player_ranking[0].total_deaths, 2);
    assert_eq!(fail.player_ranking[0].average_death_time, 50.0);
    assert_eq!(fail.player_ranking[1].player_name, "A");
    assert_eq!(fail.player_ranking[1].total_deaths, 1);
}

#[test]
fn test_ranking_ties_keep_first_seen_order() {
    let report = run(vec![fight(
        "n1",
        1,
        false,
        120.0,
        vec![death("Zed", "Q", 10.0), death("Amy", "R", 11.0)],
    )]);
    let names: Vec<&str> = report
        .fail_analysis
        .player_ranking
        .iter()
        .map(|p| p.player_name.as_str())
        .collect();
    assert_eq!(names, vec!["Zed", "Amy"]);
}

#[test]
fn test_after_wipe_deaths_not_ranked() {
    let report = run(vec![fight(
        "n1",
        1,
        false,
        100.0,
        vec![death("A", "X", 20.0), after_wipe(death("B", "Y", 90.0))],
    )]);
    let fail = &report.fail_analysis;

    assert_eq!(fail.player_ranking.len(), 1);
    assert_eq!(fail.ability_ranking.len(), 1);
    assert_eq!(report.most_deadly_abilities.len(), 1);
    assert_eq!(report.most_deadly_abilities[0].ability, "X");
}

#[test]
fn test_deadly_combos_exclude_singletons() {
    let report = run(vec![
        fight(
            "n1",
            1,
            false,
            120.0,
            vec![death("B", "X", 10.0), death("A", "Y", 12.0)],
        ),
        fight("n1", 2, false, 120.0, vec![death("B", "X", 15.0)]),
    ]);
    let combos = &report.fail_analysis.deadly_combos;
    assert_eq!(combos.len(), 1);
    assert_eq!(combos[0].player, "B");
    assert_eq!(combos[0].ability, "X");
    assert_eq!(combos[0].count, 2);
}

#[test]
fn test_most_deadly_abilities_capped() {
    let deaths = (0..12)
        .map(|i| death(&format!("P{}", i), &format!("Ability{}", i), i as f64))
        .collect();
    let report = run(vec![fight("n1", 1, false, 200.0, deaths)]);
    assert_eq!(report.most_deadly_abilities.len(), 10);
    assert_eq!(report.fail_analysis.ability_ranking.len(), 12);
}

// ─────────────────────────────────────────────────────────────────────────────
// Counts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_top_level_counts_average_over_wipes_only() {
    let report = run(vec![
        fight("n1", 1, false, 100.0, vec![death("A", "X", 10.0), death("B", "X", 20.0)]),
        fight(
            "n1",
            2,
            false,
            100.0,
            vec![
                death("A", "X", 10.0),
                death("B", "X", 20.0),
                death("C", "X", 30.0),
                death("D", "X", 40.0),
                after_wipe(death("E", "X", 95.0)),
            ],
        ),
        fight(
            "n1",
            3,
            true,
            300.0,
            vec![death("A", "X", 10.0), death("B", "X", 20.0), death("C", "X", 30.0)],
        ),
    ]);

    assert_eq!(report.boss_name, "Araz");
    assert_eq!(report.difficulty, Some(5));
    assert_eq!(report.total_attempts, 3);
    assert_eq!(report.total_kills, 1);
    assert_eq!(report.total_wipes, 2);
    // (2 + 4) / 2 wipes; the kill's three deaths do not count
    assert_eq!(report.average_deaths_before_wipe, 3.0);
}

#[test]
fn test_empty_comparison() {
    let report = run(vec![]);
    assert_eq!(report.total_attempts, 0);
    assert_eq!(report.average_deaths_before_wipe, 0.0);
    assert_eq!(report.fail_analysis.global_average_survival, 0.0);
    assert!(report.fail_analysis.critical_deaths_by_night.is_empty());
    assert!(report.fail_analysis.deaths_by_phase.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// First deaths and critical deaths
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_first_deaths_in_processing_order_and_skip_kills() {
    let report = run(vec![
        fight("n1", 1, false, 100.0, vec![death("A", "X", 5.0), death("B", "Y", 8.0)]),
        fight("n1", 2, true, 100.0, vec![death("C", "X", 3.0)]),
        fight("n1", 3, false, 100.0, vec![death("B", "Y", 7.0)]),
        fight("n1", 4, false, 100.0, vec![after_wipe(death("D", "Z", 99.0))]),
    ]);
    let firsts = &report.fail_analysis.first_deaths;

    assert_eq!(firsts.len(), 2);
    assert_eq!(firsts[0].player, "A");
    assert_eq!(firsts[0].time_secs, 5.0);
    assert_eq!(firsts[0].date, "2025-01-02");
    assert_eq!(firsts[1].player, "B");
    assert_eq!(firsts[1].attempt_number, 3);

    let b = report
        .fail_analysis
        .player_ranking
        .iter()
        .find(|p| p.player_name == "B")
        .unwrap();
    assert_eq!(b.first_death_count, 1);
    let c = report
        .fail_analysis
        .player_ranking
        .iter()
        .find(|p| p.player_name == "C")
        .unwrap();
    assert_eq!(c.first_death_count, 0);
}

#[test]
fn test_first_deaths_capped_but_counts_uncapped() {
    let comparisons = (1..=25)
        .map(|n| fight("n1", n, false, 100.0, vec![death("A", "X", n as f64)]))
        .collect();
    let report = run(comparisons);
    let fail = &report.fail_analysis;

    assert_eq!(fail.first_deaths.len(), 20);
    assert_eq!(fail.first_deaths[0].attempt_number, 1);
    assert_eq!(fail.first_deaths[19].attempt_number, 20);
    assert_eq!(fail.player_ranking[0].first_death_count, 25);
}

#[test]
fn test_first_deaths_keep_earliest_night() {
    let mut comparisons: Vec<FightComparison> = (1..=20)
        .map(|n| fight("n2", n, false, 100.0, vec![death("B", "Y", 10.0)]))
        .collect();
    comparisons.insert(0, fight("n1", 1, false, 100.0, vec![death("A", "X", 4.0)]));
    let report = run(comparisons);

    let firsts = &report.fail_analysis.first_deaths;
    assert_eq!(firsts.len(), 20);
    assert_eq!(firsts[0].player, "A");
    let numbers: Vec<u32> = firsts[1..].iter().map(|f| f.attempt_number).collect();
    assert_eq!(numbers, (1..=19).collect::<Vec<u32>>());
}

#[test]
fn test_critical_deaths_grouped_by_night() {
    let report = run(vec![
        fight(
            "n1",
            1,
            false,
            100.0,
            vec![
                death("A", "X", 5.0),
                death("B", "Y", 6.0),
                death("C", "Z", 7.0),
                death("D", "X", 8.0),
            ],
        ),
        fight("n1", 2, true, 200.0, vec![death("A", "X", 50.0)]),
        fight("night2", 1, false, 100.0, vec![death("E", "Y", 12.0)]),
    ]);
    let nights = &report.fail_analysis.critical_deaths_by_night;

    assert_eq!(nights.len(), 2);
    assert_eq!(nights[0].session_id, "n1");
    assert_eq!(nights[0].attempts.len(), 2);

    let first = &nights[0].attempts[0];
    assert_eq!(first.critical_deaths.len(), 3);
    assert_eq!(first.critical_deaths[2].player, "C");
    assert_eq!(first.critical_deaths[2].death_number, 3);
    assert_eq!(first.critical_deaths[0].source, "Boss");
    assert_eq!(first.fight_percentage, Some(40.0));

    let kill = &nights[0].attempts[1];
    assert!(kill.kill);
    assert!(kill.critical_deaths.is_empty());

    assert_eq!(nights[1].session_id, "night2");
    assert_eq!(nights[1].date, "2025-01-06");
    assert_eq!(nights[1].attempts[0].critical_deaths[0].death_number, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Phases
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_phase_histogram_counts_each_death_once() {
    let report = run(vec![fight(
        "n1",
        1,
        false,
        400.0,
        vec![
            death("A", "X", 10.0),
            death("B", "X", 29.9),
            death("A", "X", 30.0),
            death("C", "X", 150.0),
            death("A", "X", 310.0),
            after_wipe(death("D", "X", 390.0)),
        ],
    )]);
    let phases = &report.fail_analysis.deaths_by_phase;

    let labels: Vec<&str> = phases.iter().map(|p| p.phase.as_str()).collect();
    assert_eq!(labels, vec!["0-30s", "30s-1min", "2-3min", "5min+"]);
    assert_eq!(phases[0].count, 2);
    assert_eq!(phases[0].players, vec!["A", "B"]);

    let total: u32 = phases.iter().map(|p| p.count).sum();
    assert_eq!(total, 5);
}

// ─────────────────────────────────────────────────────────────────────────────
// Survival
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_survival_without_roster() {
    let report = run(vec![
        fight(
            "n1",
            1,
            false,
            100.0,
            vec![death("A", "X", 40.0), after_wipe(death("B", "Y", 90.0))],
        ),
        fight("n1", 2, false, 120.0, vec![death("A", "X", 60.0)]),
    ]);
    let fail = &report.fail_analysis;
    assert_eq!(fail.survival_stats.len(), 2);

    // B's only death is at 90s, which beats A's 50s average
    let b = &fail.survival_stats[0];
    assert_eq!(b.player_name, "B");
    assert_eq!(b.total_fights_present, 2);
    assert_eq!(b.total_deaths, 1);
    assert_eq!(b.deaths_after_wipe_call, 1);
    assert_eq!(b.fights_survived_full, 1);
    assert_eq!(b.survival_rate, 50.0);
    assert_eq!(b.survival_times_after_wipe, vec![90.0]);
    assert_eq!(b.fight_durations, vec![100.0, 120.0]);

    let a = &fail.survival_stats[1];
    assert_eq!(a.player_name, "A");
    assert_eq!(a.average_survival_time, 50.0);
    assert_eq!(a.deaths_before_wipe_call, 2);
    assert_eq!(a.fights_survived_full, 0);
    assert_eq!(a.survival_rate, 0.0);
    assert_eq!(
        a.deaths_before_wipe_call + a.deaths_after_wipe_call,
        a.total_deaths
    );

    // (40 + 60 + 90) / 3
    assert!((fail.global_average_survival - 63.333).abs() < 0.001);
}

#[test]
fn test_survival_with_roster() {
    let mut first = fight("n1", 1, false, 100.0, vec![death("A", "X", 40.0)]);
    first.roster = Some(vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    let mut second = fight("n1", 2, false, 100.0, vec![death("A", "X", 50.0)]);
    second.roster = Some(vec!["A".to_string(), "B".to_string()]);

    let report = run(vec![first, second]);
    let stats = &report.fail_analysis.survival_stats;
    let find = |name: &str| stats.iter().find(|s| s.player_name == name).unwrap();

    assert_eq!(find("A").total_fights_present, 2);
    assert_eq!(find("A").fights_survived_full, 0);
    assert_eq!(find("B").total_fights_present, 2);
    assert_eq!(find("B").survival_rate, 100.0);
    assert_eq!(find("C").total_fights_present, 1);
    assert_eq!(find("C").fights_survived_full, 1);
    assert!(find("C").survival_times.is_empty());
}

#[test]
fn test_survival_roster_misses_a_victim() {
    // Death log wins over a stale roster
    let mut attempt = fight("n1", 1, false, 100.0, vec![death("Late", "X", 30.0)]);
    attempt.roster = Some(vec!["A".to_string()]);

    let report = run(vec![attempt]);
    let late = report
        .fail_analysis
        .survival_stats
        .iter()
        .find(|s| s.player_name == "Late")
        .unwrap();
    assert_eq!(late.total_fights_present, 1);
    assert_eq!(late.total_deaths, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter and determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_boss_filter() {
    let filter = BossFilter::new("araz", Some(5));
    let mut attempt = AttemptInfo {
        name: "Forgeweaver Araz".to_string(),
        difficulty: Some(5),
        ..Default::default()
    };
    assert!(filter.matches(&attempt));

    attempt.difficulty = Some(4);
    assert!(!filter.matches(&attempt));
    attempt.difficulty = None;
    assert!(!filter.matches(&attempt));
    assert!(BossFilter::new("ARAZ", None).matches(&attempt));

    attempt.name = "Nexus-King Salhadaar".to_string();
    assert!(!BossFilter::new("araz", None).matches(&attempt));
}

#[test]
fn test_summarize_is_deterministic() {
    let input = || {
        vec![
            fight(
                "n1",
                1,
                false,
                100.0,
                vec![
                    death("A", "X", 10.0),
                    death("B", "Y", 10.0),
                    death("C", "X", 10.0),
                    death("B", "X", 12.0),
                    after_wipe(death("D", "Z", 80.0)),
                ],
            ),
            fight("n2", 1, false, 110.0, vec![death("C", "Y", 15.0), death("A", "Y", 16.0)]),
            fight("n2", 2, true, 150.0, vec![]),
        ]
    };

    let first = serde_json::to_string(&run(input())).unwrap();
    let second = serde_json::to_string(&run(input())).unwrap();
    assert_eq!(first, second);
}
