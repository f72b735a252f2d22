//! Plain-text rendering of the analysis reports.

use wipecall_core::formatting::{
    difficulty_name, format_dps, format_fight_time, format_pct, format_time_delta,
    format_vs_reference,
};
use wipecall_core::aggregate::phase_label;
use wipecall_core::{BossComparison, BossSummary, DeathAnalysis, DpsReport, TimeWindow};

fn boss_title(name: &str, difficulty: Option<u32>) -> String {
    match difficulty {
        Some(d) => format!("{} ({})", name, difficulty_name(d)),
        None => name.to_string(),
    }
}

fn section(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "─".repeat(title.chars().count()));
}

pub fn print_bosses(bosses: &[BossSummary]) {
    if bosses.is_empty() {
        println!("No bosses found");
        return;
    }
    for boss in bosses {
        println!(
            "{:<36} {:>4} attempts {:>3} kills",
            boss_title(&boss.name, boss.difficulty),
            boss.attempts,
            boss.kills
        );
    }
}

pub fn print_attempt(analysis: &DeathAnalysis) {
    println!(
        "{} (attempt {}): {} deaths, {} before / {} after the wipe call",
        analysis.attempt_name,
        analysis.attempt_id,
        analysis.total_deaths,
        analysis.deaths_before_wipe,
        analysis.deaths_after_wipe
    );
    match analysis.wipe_call_secs {
        Some(t) => println!("Wipe called at {}", format_fight_time(t)),
        None => println!("No wipe call detected"),
    }

    section("Deaths");
    for death in &analysis.deaths {
        let marker = if death.is_after_wipe_call { "  (after call)" } else { "" };
        println!(
            "  {:>6}  {:<9} {:<20} {}{}",
            format_fight_time(death.fight_time_secs),
            phase_label(death.fight_time_secs),
            death.player_name,
            death.killing_ability,
            marker
        );
    }
}

pub fn print_comparison(report: &BossComparison, european: bool) {
    let fail = &report.fail_analysis;

    println!(
        "{}: {} attempts, {} kills, {} wipes",
        boss_title(&report.boss_name, report.difficulty),
        report.total_attempts,
        report.total_kills,
        report.total_wipes
    );
    println!(
        "Average deaths before the wipe call: {:.1}",
        report.average_deaths_before_wipe
    );

    section("Attempts");
    for fight in &report.comparisons {
        let outcome = if fight.kill {
            "kill".to_string()
        } else {
            match fight.fight_percentage {
                Some(pct) => format!("wipe {}", format_pct(pct, european)),
                None => "wipe".to_string(),
            }
        };
        let call = fight
            .death_analysis
            .wipe_call_secs
            .map(|t| format!(", call at {}", format_fight_time(t)))
            .unwrap_or_default();
        println!(
            "  {} #{:<3} {:>6}  {:<12} {} deaths{}",
            fight.session_date,
            fight.attempt_number,
            format_fight_time(fight.duration_secs),
            outcome,
            fight.death_analysis.total_deaths,
            call
        );
    }

    section("Deadliest abilities");
    for ability in &report.most_deadly_abilities {
        println!("  {:<32} {:>4}", ability.ability, ability.death_count);
    }

    section("Player deaths before the wipe call");
    for player in &fail.player_ranking {
        println!(
            "  {:<20} {:>4} deaths  avg {:>6}  first death {}x",
            player.player_name,
            player.total_deaths,
            format_fight_time(player.average_death_time),
            player.first_death_count
        );
    }

    if !fail.deadly_combos.is_empty() {
        section("Repeated deaths");
        for combo in &fail.deadly_combos {
            println!("  {:<20} {:<32} {}x", combo.player, combo.ability, combo.count);
        }
    }

    section("Deaths by phase");
    for phase in &fail.deaths_by_phase {
        println!(
            "  {:<9} {:>4}  {}",
            phase.phase,
            phase.count,
            phase.players.join(", ")
        );
    }

    section("Recent first deaths");
    for first in &fail.first_deaths {
        println!(
            "  {} #{:<3} {:>6}  {:<20} {}",
            first.date,
            first.attempt_number,
            format_fight_time(first.time_secs),
            first.player,
            first.ability
        );
    }

    section("Opening deaths by night");
    for night in &fail.critical_deaths_by_night {
        println!("  {} ({})", night.date, night.session_id);
        for attempt in &night.attempts {
            if attempt.kill {
                println!("    #{:<3} kill", attempt.attempt_number);
                continue;
            }
            let deaths: Vec<String> = attempt
                .critical_deaths
                .iter()
                .map(|d| {
                    format!(
                        "{}. {} {} ({})",
                        d.death_number,
                        d.player,
                        format_fight_time(d.time_secs),
                        d.ability
                    )
                })
                .collect();
            println!("    #{:<3} {}", attempt.attempt_number, deaths.join("  "));
        }
    }

    section("Survival");
    println!(
        "  Raid average: {}",
        format_fight_time(fail.global_average_survival)
    );
    for player in &fail.survival_stats {
        println!(
            "  {:<20} avg {:>6} ({:>6})  survived {}/{} ({})",
            player.player_name,
            format_fight_time(player.average_survival_time),
            format_time_delta(player.average_survival_time - fail.global_average_survival),
            player.fights_survived_full,
            player.total_fights_present,
            format_pct(player.survival_rate, european)
        );
    }
}

fn window_label(window: &TimeWindow) -> String {
    if window.is_open() {
        return "full attempts".to_string();
    }
    format!(
        "{} to {}",
        format_fight_time(window.start_secs.unwrap_or(0.0)),
        window
            .end_secs
            .map(format_fight_time)
            .unwrap_or_else(|| "end".to_string())
    )
}

pub fn print_dps(report: &DpsReport, european: bool) {
    println!(
        "{}: {} attempts, {}, average {} per attempt",
        boss_title(&report.boss_name, report.difficulty),
        report.total_fights,
        window_label(&report.time_filter),
        format_fight_time(report.average_fight_duration)
    );
    println!(
        "Raid average DPS: {}",
        format_dps(report.global_average_dps, european)
    );

    section("Players");
    println!(
        "  {:<20} {:<14} {:>9} {:>9} {:>9} {:>9} {:>6} {:>5}  vs spec",
        "Name", "Spec", "Average", "Median", "Min", "Max", "Pulls", "Cons"
    );
    for player in &report.players {
        let vs_spec = player
            .spec_comparison
            .as_ref()
            .map(|c| {
                format!(
                    "{} (n={})",
                    format_vs_reference(c.vs_average, european),
                    c.sample_size
                )
            })
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<20} {:<14} {:>9} {:>9} {:>9} {:>9} {:>6} {:>5}  {}",
            player.name,
            player.spec.as_deref().unwrap_or("-"),
            format_dps(player.average_dps, european),
            format_dps(player.median_dps, european),
            format_dps(player.min_dps, european),
            format_dps(player.max_dps, european),
            player.fight_count,
            player.consistency,
            vs_spec
        );
    }
}
