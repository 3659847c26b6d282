//! Commands every herald tree starts with.

use {
    herald_commands::{
        CommandNode, CommandOptions, Requirements, ResponseGenerator, Result, handler,
    },
    rand::{Rng, seq::IndexedRandom},
};

const EIGHT_BALL: &[&str] = &[
    "It is certain.",
    "Ask again later.",
    "Don't count on it.",
    "Signs point to yes.",
    "Very doubtful.",
];

const MAX_DICE: u32 = 100;

/// Root plus the built-in commands.
pub fn command_tree() -> Result<CommandNode> {
    let mut root = CommandNode::root(ResponseGenerator::computed(|_, args| {
        Ok(args.first().map(|cmd| format!("Unknown command `{cmd}`.")))
    }));

    root.register_child("ping", "pong", CommandOptions::default())?;

    root.register_child(
        "echo",
        ResponseGenerator::computed(|_, args| {
            Ok((!args.is_empty()).then(|| args.join(" ")))
        }),
        CommandOptions::default(),
    )?;

    root.register_child(
        "choose",
        ResponseGenerator::computed(|_, args| {
            Ok(Some(match args.choose(&mut rand::rng()) {
                Some(pick) => format!("I choose {pick}."),
                None => "Give me something to choose from.".to_string(),
            }))
        }),
        CommandOptions::default().alias("pick"),
    )?;

    root.register_child(
        "roll",
        ResponseGenerator::computed(|_, args| {
            let notation = args.first().map(String::as_str).unwrap_or("1d6");
            Ok(Some(match parse_dice(notation) {
                Some((count, sides)) => {
                    let mut rng = rand::rng();
                    let rolls: Vec<u32> =
                        (0..count).map(|_| rng.random_range(1..=sides)).collect();
                    let total: u32 = rolls.iter().sum();
                    format!("{notation}: {total} {rolls:?}")
                },
                None => "usage: roll [NdM]".to_string(),
            }))
        }),
        CommandOptions::default().alias("r"),
    )?;

    root.register_child(
        "8ball",
        ResponseGenerator::weighted(EIGHT_BALL.iter().map(|answer| {
            handler(move |_, args| {
                Ok((!args.is_empty()).then(|| answer.to_string()))
            })
        })),
        CommandOptions::default().alias("eightball"),
    )?;

    root.register_child(
        "whoami",
        ResponseGenerator::computed(|inv, _| {
            let roles = inv.actor.role_ids();
            Ok(Some(if roles.is_empty() {
                format!("{} ({})", inv.actor.id(), inv.context.chat_type())
            } else {
                let names: Vec<&str> = roles
                    .iter()
                    .map(|id| inv.context.role_name(id).unwrap_or(id))
                    .collect();
                format!(
                    "{} ({}), roles: {}",
                    inv.actor.id(),
                    inv.context.chat_type(),
                    names.join(", ")
                )
            }))
        }),
        CommandOptions::default(),
    )?;

    register_moderation(&mut root)?;
    Ok(root)
}

fn register_moderation(root: &mut CommandNode) -> Result<()> {
    let group = root.register_child(
        "mod",
        "usage: mod <purge|warn> ...",
        CommandOptions::default()
            .case_insensitive(true)
            .guild_only(true),
    )?;

    group.register_child(
        "purge",
        ResponseGenerator::computed(|_, args| {
            Ok(Some(match args.first().and_then(|n| n.parse::<u32>().ok()) {
                Some(n) if n > 0 => format!("Purged {n} messages."),
                _ => "usage: mod purge <count>".to_string(),
            }))
        }),
        CommandOptions::default()
            .delete_invoking_message(true)
            .requirements(Requirements::default().require_capability("manage_messages", true)),
    )?;

    group.register_child(
        "warn",
        ResponseGenerator::computed(|inv, args| {
            Ok(Some(match args.split_first() {
                Some((user, reason)) if !reason.is_empty() => {
                    format!("{} warned {user}: {}", inv.actor.id(), reason.join(" "))
                },
                Some((user, _)) => format!("{} warned {user}.", inv.actor.id()),
                None => "usage: mod warn <user> [reason]".to_string(),
            }))
        }),
        CommandOptions::default().alias("w").requirements(
            Requirements::default()
                .require_capability("kick_members", true)
                .allow_group_name("Moderators"),
        ),
    )?;
    Ok(())
}

/// Parse `NdM` (or `dM`) with sane bounds.
fn parse_dice(notation: &str) -> Option<(u32, u32)> {
    let lower = notation.to_ascii_lowercase();
    let (count, sides) = lower.split_once('d')?;
    let count = if count.is_empty() {
        1
    } else {
        count.parse().ok()?
    };
    let sides: u32 = sides.parse().ok()?;
    ((1..=MAX_DICE).contains(&count) && (2..=1000).contains(&sides)).then_some((count, sides))
}
