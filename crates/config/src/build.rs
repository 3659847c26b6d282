use {herald_commands::CommandNode, tracing::debug};

use crate::{
    error::{Error, Result},
    schema::CommandConfig,
};

/// Register `commands` (and their children) under `parent`.
///
/// Stops at the first registration error; the error names the full command
/// path. Returns the number of commands registered.
pub fn apply_commands(parent: &mut CommandNode, commands: &[CommandConfig]) -> Result<usize> {
    apply_at(parent, commands, &[])
}

fn apply_at(parent: &mut CommandNode, commands: &[CommandConfig], prefix: &[&str]) -> Result<usize> {
    let mut count = 0;
    for cmd in commands {
        let mut path = prefix.to_vec();
        path.push(&cmd.label);

        let node = parent
            .register_child(cmd.label.as_str(), cmd.generator(), cmd.options())
            .map_err(|source| Error::Command {
                path: path.join(" "),
                source,
            })?;
        debug!(command = %path.join(" "), children = cmd.children.len(), "applied command config");
        count += 1 + apply_at(node, &cmd.children, &path)?;
    }
    Ok(count)
}
