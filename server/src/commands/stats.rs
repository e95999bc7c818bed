//! The statistics report command
//!
//! `stats` reports the sender, `stats <player>` another online player,
//! `extended` appends the travel and combat block, and `only <statistic>`
//! prints a single counter raw. Target names resolve among online
//! players only.

use super::{CommandContext, CommandError, CommandOutcome, OnlinePlayer, StatisticsSource};
use shared::{pretty_duration, si_prefix, Item, Statistic, Unit};

pub fn execute(ctx: &mut CommandContext, args: &[String]) -> CommandOutcome {
    if args.is_empty() {
        let player = match ctx.sender.player() {
            Some(player) => player.clone(),
            None => return CommandOutcome::Rejected(CommandError::NotAPlayer),
        };
        let mut lines = vec!["Your stats:".to_string()];
        lines.extend(report(ctx.statistics, &player, false));
        return CommandOutcome::Handled(lines);
    }

    let mut extended = false;
    if args.len() > 1 {
        match args[1].to_lowercase().as_str() {
            "extended" => extended = true,
            "only" => return only_report(ctx, args),
            _ => return CommandOutcome::NotApplicable,
        }
    }

    match ctx.directory.resolve_online(&args[0]) {
        Some(target) => {
            let mut lines = vec![format!("{}\u{2019}s stats:", target.name)];
            lines.extend(report(ctx.statistics, &target, extended));
            CommandOutcome::Handled(lines)
        }
        None => CommandOutcome::Rejected(CommandError::PlayerNotFound),
    }
}

/// The `only` form. The statistic token is vetted before the target
/// resolves, so an unknown statistic wins over an unknown player.
fn only_report(ctx: &CommandContext, args: &[String]) -> CommandOutcome {
    let stat_name = match args.get(2) {
        Some(token) => token,
        None => return CommandOutcome::Rejected(CommandError::MissingArguments),
    };
    let stat = match Statistic::from_name(stat_name) {
        Some(stat) => stat,
        None => return CommandOutcome::Rejected(CommandError::UnknownStatistic),
    };
    if stat.requires_qualifier() {
        return CommandOutcome::Rejected(CommandError::UnsupportedStatistic);
    }
    let target = match ctx.directory.resolve_online(&args[0]) {
        Some(target) => target,
        None => return CommandOutcome::Rejected(CommandError::PlayerNotFound),
    };

    let value = ctx.statistics.counter(&target.user_key(), stat, None);
    CommandOutcome::Handled(vec![format!(
        "{}\u{2019}s {} statistic: {}",
        target.name,
        stat.name(),
        value
    )])
}

fn report(stats: &dyn StatisticsSource, target: &OnlinePlayer, extended: bool) -> Vec<String> {
    let user = target.user_key();
    let mut lines = vec![
        format!("- Deaths: {}", rendered(stats, &user, Statistic::Deaths)),
        format!("- Mob kills: {}", rendered(stats, &user, Statistic::MobKills)),
        format!(
            "- Player kills: {}",
            rendered(stats, &user, Statistic::PlayerKills)
        ),
        format!(
            "- Time played: {}",
            rendered(stats, &user, Statistic::PlayTime)
        ),
        format!(
            "- Time since last death: {}",
            rendered(stats, &user, Statistic::TimeSinceDeath)
        ),
        format!("- Registered since: {}", registered_since(stats, &user)),
    ];

    if extended {
        lines.push(format!(
            "- Distance by elytra: {}",
            rendered(stats, &user, Statistic::ElytraCm)
        ));
        lines.push(format!(
            "- Distance by minecart: {}",
            rendered(stats, &user, Statistic::MinecartCm)
        ));
        lines.push(format!(
            "- Distance by horse: {}",
            rendered(stats, &user, Statistic::HorseCm)
        ));
        lines.push(format!(
            "- Distance walked: {}",
            rendered(stats, &user, Statistic::WalkCm)
        ));
        lines.push(format!(
            "- Damage taken: {}",
            rendered(stats, &user, Statistic::DamageTaken)
        ));
        lines.push(format!(
            "- Damage dealt: {}",
            rendered(stats, &user, Statistic::DamageDealt)
        ));
        lines.push(format!(
            "- Times jumped: {}",
            rendered(stats, &user, Statistic::Jumps)
        ));
        lines.push(format!(
            "- Raids won: {}",
            rendered(stats, &user, Statistic::RaidsWon)
        ));
        lines.push(format!(
            "- Diamonds picked up: {}",
            stats.counter(&user, Statistic::PickUp, Some(Item::Diamond))
        ));
    }

    lines
}

/// Unit-aware rendering for report lines. The `only` form bypasses this
/// and always prints the raw counter.
fn rendered(stats: &dyn StatisticsSource, user: &str, stat: Statistic) -> String {
    let value = stats.counter(user, stat, None);
    match stat.unit() {
        Unit::Count => value.to_string(),
        Unit::Centimeters => format!("{}m", si_prefix(value)),
        Unit::Ticks => pretty_duration(value),
    }
}

fn registered_since(stats: &dyn StatisticsSource, user: &str) -> String {
    match stats.registered_at(user) {
        Some(timestamp) => timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown".to_string(),
    }
}

pub fn tab_complete(ctx: &CommandContext, args: &[String]) -> Vec<String> {
    match args.len() {
        1 => super::partial_matches(&args[0], ctx.directory.online_names()),
        2 => super::partial_matches(&args[1], ["extended", "only"]),
        3 => {
            if !args[1].eq_ignore_ascii_case("only") {
                return Vec::new();
            }
            super::partial_matches(&args[2], Statistic::ALL.iter().map(|stat| stat.name()))
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_manager::ClientManager;
    use crate::commands::CommandSender;
    use crate::player_data::DataManager;
    use crate::statistics::StatisticsTracker;

    struct Fixture {
        clients: ClientManager,
        data: DataManager,
        stats: StatisticsTracker,
    }

    impl Fixture {
        fn new() -> Self {
            let mut clients = ClientManager::new(8);
            clients
                .add_client("127.0.0.1:9010".parse().unwrap(), "Alice")
                .unwrap();
            clients
                .add_client("127.0.0.1:9011".parse().unwrap(), "Bob")
                .unwrap();

            let mut stats = StatisticsTracker::new();
            stats.register("bob");
            stats.add("bob", Statistic::Deaths, 3);
            stats.add("bob", Statistic::MobKills, 12);
            stats.add("bob", Statistic::PlayTime, 20 * 61);
            stats.add("bob", Statistic::WalkCm, 1_234_567);
            stats.add("bob", Statistic::Jumps, 7);
            stats.add_item("bob", Statistic::PickUp, Item::Diamond, 4);

            Self {
                clients,
                data: DataManager::new(),
                stats,
            }
        }

        fn ctx(&mut self, sender: CommandSender) -> CommandContext<'_> {
            CommandContext {
                sender,
                directory: &self.clients,
                preferences: &mut self.data,
                statistics: &self.stats,
            }
        }
    }

    fn alice() -> CommandSender {
        CommandSender::Player(OnlinePlayer {
            id: 1,
            name: "Alice".to_string(),
        })
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn lines(outcome: CommandOutcome) -> Vec<String> {
        match outcome {
            CommandOutcome::Handled(lines) => lines,
            other => panic!("Expected handled outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_console_cannot_ask_for_own_stats() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(CommandSender::Console);
        assert_eq!(
            execute(&mut ctx, &[]),
            CommandOutcome::Rejected(CommandError::NotAPlayer)
        );
    }

    #[test]
    fn test_own_report_header_and_basic_lines() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        let report = lines(execute(&mut ctx, &[]));

        assert_eq!(report[0], "Your stats:");
        assert!(report.contains(&"- Deaths: 0".to_string()));
        assert!(report.contains(&"- Time played: 0s".to_string()));
        assert!(report.contains(&"- Registered since: unknown".to_string()));
        assert!(!report.iter().any(|l| l.starts_with("- Distance walked:")));
    }

    #[test]
    fn test_other_player_report_uses_canonical_name() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        let report = lines(execute(&mut ctx, &args(&["bob"])));

        assert_eq!(report[0], "Bob\u{2019}s stats:");
        assert!(report.contains(&"- Deaths: 3".to_string()));
        assert!(report.contains(&"- Mob kills: 12".to_string()));
        assert!(report.contains(&"- Time played: 1m 1s".to_string()));
    }

    #[test]
    fn test_registered_line_renders_calendar_time() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        let report = lines(execute(&mut ctx, &args(&["Bob"])));

        let line = report
            .iter()
            .find(|l| l.starts_with("- Registered since: "))
            .expect("registered line missing");
        let value = line.trim_start_matches("- Registered since: ");
        // yyyy-mm-dd HH:MM:SS
        assert_eq!(value.len(), 19);
        assert_eq!(&value[4..5], "-");
        assert_eq!(&value[10..11], " ");
        assert_eq!(&value[13..14], ":");
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        assert_eq!(
            execute(&mut ctx, &args(&["Ghost"])),
            CommandOutcome::Rejected(CommandError::PlayerNotFound)
        );
    }

    #[test]
    fn test_extended_report_adds_travel_block() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        let report = lines(execute(&mut ctx, &args(&["Bob", "extended"])));

        assert!(report.contains(&"- Distance walked: 12.35 km".to_string()));
        assert!(report.contains(&"- Distance by elytra: 0 cm".to_string()));
        assert!(report.contains(&"- Times jumped: 7".to_string()));
        assert!(report.contains(&"- Diamonds picked up: 4".to_string()));
    }

    #[test]
    fn test_extended_mode_is_case_insensitive() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        let report = lines(execute(&mut ctx, &args(&["Bob", "EXTENDED"])));
        assert!(report.iter().any(|l| l.starts_with("- Damage taken:")));
    }

    #[test]
    fn test_unknown_mode_is_not_applicable() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        assert_eq!(
            execute(&mut ctx, &args(&["Bob", "banana"])),
            CommandOutcome::NotApplicable
        );
    }

    #[test]
    fn test_only_prints_single_raw_line() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        let report = lines(execute(&mut ctx, &args(&["bob", "only", "deaths"])));

        assert_eq!(report, vec!["Bob\u{2019}s deaths statistic: 3".to_string()]);
    }

    #[test]
    fn test_only_keeps_distance_counters_raw() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        let report = lines(execute(&mut ctx, &args(&["Bob", "only", "walk_cm"])));
        assert_eq!(
            report,
            vec!["Bob\u{2019}s walk_cm statistic: 1234567".to_string()]
        );
    }

    #[test]
    fn test_only_requires_statistic_name() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        assert_eq!(
            execute(&mut ctx, &args(&["Bob", "only"])),
            CommandOutcome::Rejected(CommandError::MissingArguments)
        );
    }

    #[test]
    fn test_only_rejects_unknown_statistic() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        assert_eq!(
            execute(&mut ctx, &args(&["Bob", "only", "bogus"])),
            CommandOutcome::Rejected(CommandError::UnknownStatistic)
        );
    }

    #[test]
    fn test_only_rejects_qualified_statistic() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        assert_eq!(
            execute(&mut ctx, &args(&["Bob", "only", "pickup"])),
            CommandOutcome::Rejected(CommandError::UnsupportedStatistic)
        );
    }

    #[test]
    fn test_only_checks_statistic_before_player() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx(alice());
        assert_eq!(
            execute(&mut ctx, &args(&["Ghost", "only", "bogus"])),
            CommandOutcome::Rejected(CommandError::UnknownStatistic)
        );
        let mut ctx = fixture.ctx(alice());
        assert_eq!(
            execute(&mut ctx, &args(&["Ghost", "only", "deaths"])),
            CommandOutcome::Rejected(CommandError::PlayerNotFound)
        );
    }

    #[test]
    fn test_complete_player_position() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx(alice());
        assert_eq!(tab_complete(&ctx, &args(&[""])), vec!["Alice", "Bob"]);
        assert_eq!(tab_complete(&ctx, &args(&["al"])), vec!["Alice"]);
        assert_eq!(tab_complete(&ctx, &args(&["x"])), Vec::<String>::new());
    }

    #[test]
    fn test_complete_mode_position() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx(alice());
        assert_eq!(
            tab_complete(&ctx, &args(&["Bob", ""])),
            vec!["extended", "only"]
        );
        assert_eq!(tab_complete(&ctx, &args(&["Bob", "e"])), vec!["extended"]);
    }

    #[test]
    fn test_complete_statistic_position_gated_on_only() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx(alice());
        assert_eq!(
            tab_complete(&ctx, &args(&["Bob", "only", "d"])),
            vec!["damage_dealt", "damage_taken", "deaths", "drop"]
        );
        assert_eq!(
            tab_complete(&ctx, &args(&["Bob", "extended", "d"])),
            Vec::<String>::new()
        );
        assert_eq!(
            tab_complete(&ctx, &args(&["Bob", "only", "deaths", "x"])),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_complete_works_for_console() {
        let mut fixture = Fixture::new();
        let ctx = fixture.ctx(CommandSender::Console);
        assert_eq!(tab_complete(&ctx, &args(&["B"])), vec!["Bob"]);
    }
}
