use std::collections::{BTreeMap, BTreeSet};

use {
    rand::Rng,
    tracing::{debug, info},
};

use crate::{
    context::{Actor, Invocation, InvocationContext},
    error::{Error, Result},
    generator::ResponseGenerator,
    permission::{self, PermissionDenied, Requirements},
};

/// Split raw message text into argument tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

/// Per-command settings supplied at registration.
///
/// Nothing is inherited from the parent.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    pub aliases: Vec<String>,
    /// Also resolve this command when the label differs only in case.
    pub case_insensitive: bool,
    /// Hint for the chat layer: delete the triggering message after running.
    pub delete_invoking_message: bool,
    /// Refuse the command in direct messages.
    pub guild_only: bool,
    pub requirements: Requirements,
}

impl CommandOptions {
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.case_insensitive = value;
        self
    }

    #[must_use]
    pub fn delete_invoking_message(mut self, value: bool) -> Self {
        self.delete_invoking_message = value;
        self
    }

    #[must_use]
    pub fn guild_only(mut self, value: bool) -> Self {
        self.guild_only = value;
        self
    }

    #[must_use]
    pub fn requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }
}

/// A command that is also the container of its subcommands.
///
/// Children are owned by their parent; the alias table only stores canonical
/// labels. All mutation goes through `&mut self`, so a tree shared between
/// tasks needs an outer lock (`Arc<RwLock<CommandNode>>`).
#[derive(Debug)]
pub struct CommandNode {
    label: String,
    aliases: Vec<String>,
    generator: ResponseGenerator,
    case_insensitive: bool,
    delete_invoking_message: bool,
    guild_only: bool,
    requirements: Requirements,
    children: BTreeMap<String, CommandNode>,
    child_aliases: BTreeMap<String, String>,
}

impl CommandNode {
    /// Create the unlabeled root of a command tree.
    pub fn root(generator: impl Into<ResponseGenerator>) -> Self {
        Self::build(String::new(), generator.into(), CommandOptions::default())
    }

    fn build(label: String, generator: ResponseGenerator, options: CommandOptions) -> Self {
        Self {
            label,
            aliases: options.aliases,
            generator,
            case_insensitive: options.case_insensitive,
            delete_invoking_message: options.delete_invoking_message,
            guild_only: options.guild_only,
            requirements: options.requirements,
            children: BTreeMap::new(),
            child_aliases: BTreeMap::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn generator(&self) -> &ResponseGenerator {
        &self.generator
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn deletes_invoking_message(&self) -> bool {
        self.delete_invoking_message
    }

    pub fn is_guild_only(&self) -> bool {
        self.guild_only
    }

    /// The settings this node would be registered with.
    pub fn options(&self) -> CommandOptions {
        CommandOptions {
            aliases: self.aliases.clone(),
            case_insensitive: self.case_insensitive,
            delete_invoking_message: self.delete_invoking_message,
            guild_only: self.guild_only,
            requirements: self.requirements.clone(),
        }
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    pub fn requirements_mut(&mut self) -> &mut Requirements {
        &mut self.requirements
    }

    pub fn set_generator(&mut self, generator: impl Into<ResponseGenerator>) -> Result<()> {
        let generator = generator.into();
        if generator.is_empty_set() {
            return Err(Error::EmptyResponseSet {
                label: self.label.clone(),
            });
        }
        self.generator = generator;
        Ok(())
    }

    pub fn set_case_insensitive(&mut self, value: bool) {
        self.case_insensitive = value;
    }

    pub fn set_delete_invoking_message(&mut self, value: bool) {
        self.delete_invoking_message = value;
    }

    pub fn set_guild_only(&mut self, value: bool) {
        self.guild_only = value;
    }

    /// Canonical children in label order.
    pub fn children(&self) -> impl Iterator<Item = &CommandNode> {
        self.children.values()
    }

    /// Look up a child by canonical label only.
    pub fn child(&self, label: &str) -> Option<&CommandNode> {
        self.children.get(label)
    }

    pub fn child_mut(&mut self, label: &str) -> Option<&mut CommandNode> {
        self.children.get_mut(label)
    }

    // ── Registration ────────────────────────────────────────────────────────

    /// Register a subcommand and return it for further configuration.
    ///
    /// Every check runs before the tree is touched, so a failed call leaves
    /// it unchanged.
    pub fn register_child(
        &mut self,
        label: impl Into<String>,
        generator: impl Into<ResponseGenerator>,
        options: CommandOptions,
    ) -> Result<&mut CommandNode> {
        let label = label.into();
        let generator = generator.into();
        validate_label(&label)?;
        if self.is_taken(&label) {
            return Err(Error::duplicate_label(label));
        }

        self.check_new_aliases(&label, &options.aliases)?;
        if generator.is_empty_set() {
            return Err(Error::EmptyResponseSet { label });
        }

        for alias in &options.aliases {
            self.child_aliases.insert(alias.clone(), label.clone());
        }
        info!(
            parent = %self.label,
            label = %label,
            aliases = ?options.aliases,
            generator = generator.kind(),
            "registered command"
        );
        let child = Self::build(label.clone(), generator, options);
        Ok(self.children.entry(label).or_insert(child))
    }

    /// Add another name for an existing child.
    pub fn register_alias(&mut self, alias: impl Into<String>, label: &str) -> Result<()> {
        let alias = alias.into();
        if !self.children.contains_key(label) {
            return Err(Error::UnknownLabel {
                label: label.to_string(),
            });
        }
        validate_label(&alias)?;
        if self.is_taken(&alias) {
            return Err(Error::duplicate_alias(alias));
        }

        if let Some(child) = self.children.get_mut(label) {
            child.aliases.push(alias.clone());
        }
        info!(parent = %self.label, alias = %alias, label, "registered alias");
        self.child_aliases.insert(alias, label.to_string());
        Ok(())
    }

    /// Remove an alias, or a child together with its aliases and subtree.
    ///
    /// Aliases take precedence: unregistering an alias never touches the
    /// canonical child.
    pub fn unregister_child(&mut self, label: &str) -> Result<()> {
        if let Some(canonical) = self.child_aliases.remove(label) {
            if let Some(child) = self.children.get_mut(&canonical) {
                child.aliases.retain(|alias| alias != label);
            }
            info!(parent = %self.label, alias = label, label = %canonical, "unregistered alias");
            return Ok(());
        }

        let Some(child) = self.children.remove(label) else {
            return Err(Error::NotFound {
                label: label.to_string(),
            });
        };
        for alias in &child.aliases {
            self.child_aliases.remove(alias);
        }
        info!(
            parent = %self.label,
            label,
            descendants = child.children.len(),
            "unregistered command"
        );
        Ok(())
    }

    fn check_new_aliases(&self, label: &str, aliases: &[String]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for alias in aliases {
            validate_label(alias)?;
            if alias == label || self.is_taken(alias) || !seen.insert(alias.as_str()) {
                return Err(Error::duplicate_alias(alias.as_str()));
            }
        }
        Ok(())
    }

    fn is_taken(&self, name: &str) -> bool {
        self.children.contains_key(name) || self.child_aliases.contains_key(name)
    }

    // ── Lookup ──────────────────────────────────────────────────────────────

    /// Resolve one token to a child: alias, then exact label, then
    /// case-insensitive label for children that opted in.
    pub fn resolve_child(&self, token: &str) -> Option<&CommandNode> {
        if let Some(canonical) = self.child_aliases.get(token) {
            return self.children.get(canonical);
        }
        if let Some(child) = self.children.get(token) {
            return Some(child);
        }
        let lowered = token.to_lowercase();
        self.children
            .values()
            .find(|child| child.case_insensitive && child.label.to_lowercase() == lowered)
    }

    /// Walk `tokens` the way dispatch would, ignoring permissions.
    ///
    /// Returns the deepest matching node and the tokens left over as its
    /// arguments.
    pub fn resolve_path<'t>(&self, tokens: &'t [String]) -> (&CommandNode, &'t [String]) {
        let (trail, rest) = self.resolve_trail(tokens);
        (trail.last().copied().unwrap_or(self), rest)
    }

    /// Like [`CommandNode::resolve_path`], but returns every node passed
    /// through, starting with `self`.
    pub fn resolve_trail<'t>(&self, tokens: &'t [String]) -> (Vec<&CommandNode>, &'t [String]) {
        let mut trail = vec![self];
        let mut node = self;
        let mut rest = tokens;
        while let Some((first, tail)) = rest.split_first()
            && let Some(child) = node.resolve_child(first)
        {
            trail.push(child);
            node = child;
            rest = tail;
        }
        (trail, rest)
    }

    // ── Permissions ─────────────────────────────────────────────────────────

    /// Check this node's requirements, reporting why access was refused.
    pub fn authorize(
        &self,
        actor: &dyn Actor,
        context: &dyn InvocationContext,
    ) -> std::result::Result<(), PermissionDenied> {
        permission::authorize(&self.requirements, self.guild_only, actor, context)
    }

    pub fn check_permission(&self, actor: &dyn Actor, context: &dyn InvocationContext) -> bool {
        self.authorize(actor, context).is_ok()
    }

    // ── Dispatch ────────────────────────────────────────────────────────────

    /// Dispatch `tokens` from this node.
    ///
    /// `Ok(None)` covers both a permission refusal and a command that chose
    /// not to reply. Handler failures come back as [`Error::Handler`].
    pub fn process(
        &self,
        tokens: &[String],
        actor: &dyn Actor,
        context: &dyn InvocationContext,
    ) -> Result<Option<String>> {
        self.process_with_rng(tokens, actor, context, &mut rand::rng())
    }

    /// Like [`CommandNode::process`], drawing weighted responses from `rng`.
    pub fn process_with_rng<R: Rng + ?Sized>(
        &self,
        tokens: &[String],
        actor: &dyn Actor,
        context: &dyn InvocationContext,
        rng: &mut R,
    ) -> Result<Option<String>> {
        let mut path = Vec::new();
        self.dispatch(tokens, actor, context, rng, &mut path)
    }

    fn dispatch<'n, R: Rng + ?Sized>(
        &'n self,
        tokens: &[String],
        actor: &dyn Actor,
        context: &dyn InvocationContext,
        rng: &mut R,
        path: &mut Vec<&'n str>,
    ) -> Result<Option<String>> {
        if !self.label.is_empty() {
            path.push(&self.label);
        }

        if let Err(reason) = self.authorize(actor, context) {
            debug!(
                command = %path.join(" "),
                actor = actor.id(),
                chat_type = %context.chat_type(),
                %reason,
                "permission denied"
            );
            return Ok(None);
        }

        if let Some((first, rest)) = tokens.split_first()
            && let Some(child) = self.resolve_child(first)
        {
            return child.dispatch(rest, actor, context, rng, path);
        }

        let invocation = Invocation {
            actor,
            context,
            path: path.as_slice(),
        };
        debug!(
            command = %invocation.command_path(),
            actor = actor.id(),
            args = tokens.len(),
            generator = self.generator.kind(),
            "executing command"
        );
        self.generator
            .generate(&invocation, tokens, rng)
            .map_err(|source| Error::handler(invocation.command_path(), source))
    }
}

fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() || label.chars().any(char::is_whitespace) {
        return Err(Error::invalid_label(label));
    }
    Ok(())
}
