//! Chat command validation, dispatch and tab completion
//!
//! Commands arrive as a name plus whitespace-split argument tokens and
//! answer with a three-way outcome: handled with response lines, rejected
//! with a message, or not a form the command knows, in which case the
//! caller falls back to a usage line. Handlers never talk to sockets;
//! they see the rest of the server through small traits so they stay
//! synchronous and testable.

use chrono::{DateTime, Utc};
use shared::{ColorSpec, Item, Statistic};
use thiserror::Error;

pub mod color;
pub mod stats;

/// Command names the dispatcher recognizes, in completion order.
pub const COMMAND_NAMES: &[&str] = &["color", "help", "stats"];

/// Lowercases a display name into the key preference and statistic
/// stores use, so records survive reconnects and case changes.
pub fn user_key(name: &str) -> String {
    name.to_lowercase()
}

/// A resolved online user: connection id plus display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlinePlayer {
    pub id: u32,
    pub name: String,
}

impl OnlinePlayer {
    pub fn user_key(&self) -> String {
        user_key(&self.name)
    }
}

/// Who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSender {
    Player(OnlinePlayer),
    /// The server console; has no identity and no preferences.
    Console,
}

impl CommandSender {
    /// The player behind the command, when there is one.
    pub fn player(&self) -> Option<&OnlinePlayer> {
        match self {
            CommandSender::Player(player) => Some(player),
            CommandSender::Console => None,
        }
    }
}

/// Stored appearance overrides for one user. An absent field means the
/// default look.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserPreference {
    pub chat_color: Option<ColorSpec>,
    pub name_color: Option<ColorSpec>,
}

/// Which preference field a color command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    Chat,
    Name,
}

impl ColorField {
    pub fn parse(token: &str) -> Option<ColorField> {
        if token.eq_ignore_ascii_case("chat") {
            Some(ColorField::Chat)
        } else if token.eq_ignore_ascii_case("name") {
            Some(ColorField::Name)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorField::Chat => "chat",
            ColorField::Name => "name",
        }
    }
}

/// The roster of currently connected users, as commands see it.
pub trait Directory {
    /// Case-insensitive exact-name lookup among online users.
    fn resolve_online(&self, name: &str) -> Option<OnlinePlayer>;
    /// Display names of everyone online, in no particular order.
    fn online_names(&self) -> Vec<String>;
}

/// Per-user appearance preferences, addressed by [`user_key`].
pub trait PreferenceStore {
    fn preferences(&self, user: &str) -> UserPreference;
    fn set_color(&mut self, user: &str, field: ColorField, color: Option<ColorSpec>);
}

/// Read-only view of the statistic counters, addressed by [`user_key`].
pub trait StatisticsSource {
    /// Raw counter value; zero when nothing was ever recorded.
    fn counter(&self, user: &str, stat: Statistic, qualifier: Option<Item>) -> u64;
    /// When the user was first seen, if ever.
    fn registered_at(&self, user: &str) -> Option<DateTime<Utc>>;
}

/// Everything a command invocation may touch.
pub struct CommandContext<'a> {
    pub sender: CommandSender,
    pub directory: &'a dyn Directory,
    pub preferences: &'a mut dyn PreferenceStore,
    pub statistics: &'a dyn StatisticsSource,
}

/// Refusals a command can answer with. The `Display` text is the exact
/// line shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("You must be a player to use this")]
    NotAPlayer,
    #[error("Invalid color specified")]
    InvalidColor,
    #[error("No online player with that name was found")]
    PlayerNotFound,
    #[error("Not a valid statistic")]
    UnknownStatistic,
    #[error("This statistic is not currently supported")]
    UnsupportedStatistic,
    #[error("You must include both a player and statistic name")]
    MissingArguments,
}

/// What a command invocation produced.
#[derive(Debug, PartialEq)]
pub enum CommandOutcome {
    /// The command ran; these lines go back to the sender.
    Handled(Vec<String>),
    /// The command matched but refused the input. No state changed.
    Rejected(CommandError),
    /// Not a form this command understands.
    NotApplicable,
}

/// Routes one parsed command line to its handler. Names match
/// case-insensitively; unknown names are not applicable.
pub fn dispatch(ctx: &mut CommandContext, name: &str, args: &[String]) -> CommandOutcome {
    match name.to_lowercase().as_str() {
        "color" => color::execute(ctx, args),
        "stats" => stats::execute(ctx, args),
        "help" => CommandOutcome::Handled(help_lines()),
        _ => CommandOutcome::NotApplicable,
    }
}

/// Completion candidates for the token under the cursor.
pub fn tab_complete(ctx: &CommandContext, name: &str, args: &[String]) -> Vec<String> {
    match name.to_lowercase().as_str() {
        "color" => color::tab_complete(ctx, args),
        "stats" => stats::tab_complete(ctx, args),
        _ => Vec::new(),
    }
}

/// Usage line for a recognized command name, or a pointer at /help.
pub fn usage(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "color" => "Usage: /color <chat|name> [color]".to_string(),
        "stats" => "Usage: /stats [player] [extended | only <statistic>]".to_string(),
        "help" => "Usage: /help".to_string(),
        _ => "Unknown command. Try /help".to_string(),
    }
}

fn help_lines() -> Vec<String> {
    vec![
        "Available commands:".to_string(),
        "  /color <chat|name> [color] - set or reset your chat or name color".to_string(),
        "  /stats [player] [extended | only <statistic>] - show player statistics".to_string(),
        "  /help - this list".to_string(),
    ]
}

/// Case-insensitive prefix filter over a candidate set, sorted for
/// presentation. An empty token admits every candidate.
pub fn partial_matches<I, S>(token: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut matches: Vec<String> = candidates
        .into_iter()
        .map(Into::into)
        .filter(|candidate| starts_with_ignore_case(candidate, token))
        .collect();
    matches.sort();
    matches
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate.len() >= prefix.len()
        && candidate.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
