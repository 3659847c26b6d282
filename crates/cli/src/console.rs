//! Line-oriented console that stands in for a chat platform.

use std::sync::{Arc, PoisonError, RwLock};

use {
    anyhow::{Context, Result, bail},
    clap::Args,
    herald_commands::{CommandNode, InvocationContext, StaticActor, StaticContext, tokenize},
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::{debug, info, warn},
};

/// Command tree shared between the reader loop and administrative lines.
pub type SharedTree = Arc<RwLock<CommandNode>>;

#[derive(Args, Debug, Clone)]
pub struct ConsoleArgs {
    /// Actor ID to invoke commands as.
    #[arg(long, default_value = "console")]
    pub actor: String,
    /// Role held by the actor, as `id` or `id=name` (repeatable).
    #[arg(long = "role")]
    pub roles: Vec<String>,
    /// Capability flag for the actor, as `name` or `name=bool` (repeatable).
    #[arg(long = "capability")]
    pub capabilities: Vec<String>,
    /// Simulate a direct message instead of a group.
    #[arg(long)]
    pub dm: bool,
    /// Group the console pretends to be in.
    #[arg(long, default_value = "console")]
    pub group_id: String,
    /// Command prefix (overrides the config file).
    #[arg(long)]
    pub prefix: Option<String>,
}

impl Default for ConsoleArgs {
    fn default() -> Self {
        Self {
            actor: "console".into(),
            roles: Vec::new(),
            capabilities: Vec::new(),
            dm: false,
            group_id: "console".into(),
            prefix: None,
        }
    }
}

impl ConsoleArgs {
    /// Build the simulated actor and context from the flags.
    pub fn identity(&self) -> Result<(StaticActor, StaticContext)> {
        let mut actor = StaticActor::new(self.actor.as_str());
        let mut ctx = if self.dm {
            StaticContext::direct()
        } else {
            StaticContext::group(self.group_id.as_str())
        };

        for role in &self.roles {
            match role.split_once('=') {
                Some((id, name)) => {
                    actor = actor.with_role(id);
                    ctx = ctx.with_role_name(id, name);
                },
                None => actor = actor.with_role(role.as_str()),
            }
        }
        for cap in &self.capabilities {
            let (name, value) = match cap.split_once('=') {
                Some((name, value)) => (
                    name,
                    value
                        .parse::<bool>()
                        .with_context(|| format!("invalid capability value in `{cap}`"))?,
                ),
                None => (cap.as_str(), true),
            };
            ctx = ctx.with_capability(name, value);
        }
        Ok((actor, ctx))
    }
}

/// What the console should do with one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Text the bot sends back.
    Reply(String),
    /// Console-level feedback, not a bot reply.
    Notice(String),
    Quit,
    Nothing,
}

pub async fn run(tree: SharedTree, prefix: String, args: ConsoleArgs) -> Result<()> {
    let (actor, ctx) = args.identity()?;
    info!(
        actor = %actor.id,
        chat_type = %ctx.chat_type,
        prefix = %prefix,
        "console ready (type :help for console commands)"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match handle_line(&tree, &prefix, &line, &actor, &ctx) {
            Ok(Outcome::Reply(text)) => println!("{text}"),
            Ok(Outcome::Notice(text)) => eprintln!("{text}"),
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Nothing) => {},
            Err(e) => {
                warn!(error = %e, "command failed");
                eprintln!("error: {e:#}");
            },
        }
    }
    Ok(())
}

/// Handle one line: `:admin` lines mutate the tree, prefixed lines dispatch.
pub fn handle_line(
    tree: &SharedTree,
    prefix: &str,
    line: &str,
    actor: &StaticActor,
    ctx: &StaticContext,
) -> Result<Outcome> {
    let line = line.trim();
    if let Some(admin) = line.strip_prefix(':') {
        return admin_line(tree, admin);
    }
    let Some(body) = line.strip_prefix(prefix) else {
        return Ok(Outcome::Nothing);
    };
    let tokens = tokenize(body);

    let tree = tree.read().unwrap_or_else(PoisonError::into_inner);
    let (trail, _) = tree.resolve_trail(&tokens);
    // The platform rejects group-only commands in DMs before dispatch.
    if ctx.is_direct()
        && let Some(node) = trail.iter().find(|node| node.is_guild_only())
    {
        return Ok(Outcome::Notice(format!(
            "`{}` only works in groups",
            node.label()
        )));
    }
    let target = trail.last().copied().unwrap_or(&*tree);

    let reply = tree.process(&tokens, actor, ctx)?;
    if reply.is_some() && target.deletes_invoking_message() {
        info!(command = target.label(), "deleting invoking message");
    }
    debug!(replied = reply.is_some(), "dispatch finished");
    Ok(reply.map_or(Outcome::Nothing, Outcome::Reply))
}

fn admin_line(tree: &SharedTree, line: &str) -> Result<Outcome> {
    let tokens = tokenize(line);
    let Some((verb, rest)) = tokens.split_first() else {
        return Ok(Outcome::Nothing);
    };

    match verb.as_str() {
        "quit" | "q" => Ok(Outcome::Quit),
        "help" => Ok(Outcome::Notice(
            ":alias <alias> <command path>   add an alias\n\
             :remove <command path>          remove a command or alias\n\
             :tree                           show the command tree\n\
             :quit                           exit"
                .to_string(),
        )),
        "tree" => {
            let tree = tree.read().unwrap_or_else(PoisonError::into_inner);
            Ok(Outcome::Notice(crate::config_commands::render_tree(&tree)))
        },
        "alias" => {
            let Some((alias, path)) = rest.split_first() else {
                bail!("usage: :alias <alias> <command path>");
            };
            let Some((label, parents)) = path.split_last() else {
                bail!("usage: :alias <alias> <command path>");
            };
            let mut tree = tree.write().unwrap_or_else(PoisonError::into_inner);
            let parent = walk_mut(&mut tree, parents)?;
            parent.register_alias(alias.as_str(), label)?;
            Ok(Outcome::Notice(format!("alias `{alias}` -> `{}`", path.join(" "))))
        },
        "remove" => {
            let Some((label, parents)) = rest.split_last() else {
                bail!("usage: :remove <command path>");
            };
            let mut tree = tree.write().unwrap_or_else(PoisonError::into_inner);
            let parent = walk_mut(&mut tree, parents)?;
            parent.unregister_child(label)?;
            Ok(Outcome::Notice(format!("removed `{}`", rest.join(" "))))
        },
        other => bail!("unknown console command `:{other}` (try :help)"),
    }
}

/// Follow canonical labels down from `root`.
fn walk_mut<'a>(root: &'a mut CommandNode, path: &[String]) -> Result<&'a mut CommandNode> {
    let mut node = root;
    for label in path {
        node = node
            .child_mut(label)
            .with_context(|| format!("no command `{label}`"))?;
    }
    Ok(node)
}
