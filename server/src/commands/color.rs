//! The color preference command
//!
//! `color chat red` sets, `color chat` resets, and the confirmation for
//! a set echoes the token the user typed rendered in the new color.

use super::{ColorField, CommandContext, CommandError, CommandOutcome};
use shared::{ColorSpec, ANSI_RESET, NAMED_COLORS};

pub fn execute(ctx: &mut CommandContext, args: &[String]) -> CommandOutcome {
    let player = match ctx.sender.player() {
        Some(player) => player.clone(),
        None => return CommandOutcome::Rejected(CommandError::NotAPlayer),
    };
    let field = match args.first().map(|kind| ColorField::parse(kind)) {
        Some(Some(field)) => field,
        // Unknown first token or no arguments at all: not a form we know.
        _ => return CommandOutcome::NotApplicable,
    };

    let user = player.user_key();
    match args.get(1) {
        None => {
            ctx.preferences.set_color(&user, field, None);
            CommandOutcome::Handled(vec![format!(
                "Your {} color has been reset",
                field.label()
            )])
        }
        Some(token) => match ColorSpec::parse(token) {
            None => CommandOutcome::Rejected(CommandError::InvalidColor),
            Some(color) => {
                ctx.preferences.set_color(&user, field, Some(color));
                CommandOutcome::Handled(vec![format!(
                    "Your {} color has been set to {}{}{}",
                    field.label(),
                    color.ansi(),
                    token,
                    ANSI_RESET
                )])
            }
        },
    }
}

pub fn tab_complete(ctx: &CommandContext, args: &[String]) -> Vec<String> {
    if ctx.sender.player().is_none() {
        return Vec::new();
    }
    match args.len() {
        1 => super::partial_matches(&args[0], ["chat", "name"]),
        2 => {
            // Color candidates only appear once the field token is valid.
            if ColorField::parse(&args[0]).is_none() {
                return Vec::new();
            }
            super::partial_matches(&args[1], NAMED_COLORS.iter().map(|(name, _)| *name))
        }
        _ => Vec::new(),
    }
}
