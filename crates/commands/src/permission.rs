use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::context::{Actor, InvocationContext};

/// Declarative access rules attached to a command.
///
/// Every empty collection means "no restriction of this kind".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Requirements {
    /// Actor IDs allowed to run the command.
    pub allowed_actor_ids: BTreeSet<String>,
    /// Capability name -> required value. All must match to pass.
    pub capabilities: BTreeMap<String, bool>,
    /// Role IDs, any of which grants access.
    pub allowed_group_ids: BTreeSet<String>,
    /// Role display names, any of which grants access.
    pub allowed_group_names: BTreeSet<String>,
}

impl Requirements {
    #[must_use]
    pub fn allow_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.allowed_actor_ids.insert(actor_id.into());
        self
    }

    #[must_use]
    pub fn require_capability(mut self, name: impl Into<String>, value: bool) -> Self {
        self.capabilities.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn allow_group_id(mut self, role_id: impl Into<String>) -> Self {
        self.allowed_group_ids.insert(role_id.into());
        self
    }

    #[must_use]
    pub fn allow_group_name(mut self, role_name: impl Into<String>) -> Self {
        self.allowed_group_names.insert(role_name.into());
        self
    }

    /// True when no rule of any kind is configured.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed_actor_ids.is_empty()
            && self.capabilities.is_empty()
            && self.allowed_group_ids.is_empty()
            && self.allowed_group_names.is_empty()
    }

    fn capabilities_match(&self, context: &dyn InvocationContext) -> bool {
        self.capabilities
            .iter()
            .all(|(name, required)| context.capability(name).unwrap_or(false) == *required)
    }

    fn role_id_match(&self, actor: &dyn Actor) -> bool {
        actor
            .role_ids()
            .iter()
            .any(|id| self.allowed_group_ids.contains(id))
    }

    fn role_name_match(&self, actor: &dyn Actor, context: &dyn InvocationContext) -> bool {
        actor
            .role_ids()
            .iter()
            .filter_map(|id| context.role_name(id))
            .any(|name| self.allowed_group_names.contains(name))
    }
}

/// Decide whether `actor` may run a command in `context`.
///
/// Order matters:
/// 1. Actor allowlist (deny on miss)
/// 2. Direct interactions: allowed only for commands that are neither
///    guild-only nor actor-restricted; no further rules apply
/// 3. Capabilities (all match: allow, skipping role rules)
/// 4. Role IDs (any match: allow)
/// 5. Role names (any match: allow)
///
/// Configured role rules that do not match deny. Unmatched capabilities
/// deny only when no role rule could have granted access.
pub fn authorize(
    requirements: &Requirements,
    guild_only: bool,
    actor: &dyn Actor,
    context: &dyn InvocationContext,
) -> Result<(), PermissionDenied> {
    if !requirements.allowed_actor_ids.is_empty()
        && !requirements.allowed_actor_ids.contains(actor.id())
    {
        return Err(PermissionDenied::ActorNotAllowed);
    }

    if context.is_direct() {
        if guild_only {
            return Err(PermissionDenied::GuildOnly);
        }
        if !requirements.allowed_actor_ids.is_empty() {
            return Err(PermissionDenied::ActorRestrictedInDirect);
        }
        return Ok(());
    }

    if !requirements.capabilities.is_empty() && requirements.capabilities_match(context) {
        return Ok(());
    }

    if !requirements.allowed_group_ids.is_empty() {
        if requirements.role_id_match(actor) {
            return Ok(());
        }
        if requirements.allowed_group_names.is_empty() {
            return Err(PermissionDenied::RolesNotAllowed);
        }
    }

    if !requirements.allowed_group_names.is_empty() {
        return if requirements.role_name_match(actor, context) {
            Ok(())
        } else {
            Err(PermissionDenied::RolesNotAllowed)
        };
    }

    if requirements.capabilities.is_empty() {
        Ok(())
    } else {
        Err(PermissionDenied::CapabilitiesMismatch)
    }
}

/// Reason a command invocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDenied {
    ActorNotAllowed,
    GuildOnly,
    ActorRestrictedInDirect,
    CapabilitiesMismatch,
    RolesNotAllowed,
}

impl std::fmt::Display for PermissionDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActorNotAllowed => write!(f, "actor not on allowlist"),
            Self::GuildOnly => write!(f, "command is group-only"),
            Self::ActorRestrictedInDirect => {
                write!(f, "actor-restricted commands are unavailable in DMs")
            },
            Self::CapabilitiesMismatch => write!(f, "required capabilities not held"),
            Self::RolesNotAllowed => write!(f, "no allowed role"),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::context::{StaticActor, StaticContext},
        rstest::rstest,
    };

    fn moderator() -> StaticActor {
        StaticActor::new("u1").with_role("r-mod")
    }

    fn guild() -> StaticContext {
        StaticContext::group("g1")
            .with_role_name("r-mod", "Moderators")
            .with_role_name("r-member", "Members")
    }

    #[test]
    fn unrestricted_allows_everyone() {
        let req = Requirements::default();
        assert!(req.is_unrestricted());
        assert!(authorize(&req, false, &StaticActor::new("x"), &guild()).is_ok());
        assert!(authorize(&req, false, &StaticActor::new("x"), &StaticContext::direct()).is_ok());
    }

    #[test]
    fn actor_allowlist() {
        let req = Requirements::default().allow_actor("u1");
        assert!(authorize(&req, false, &moderator(), &guild()).is_ok());
        assert_eq!(
            authorize(&req, false, &StaticActor::new("u2"), &guild()),
            Err(PermissionDenied::ActorNotAllowed)
        );
    }

    #[test]
    fn actor_allowlist_is_group_only() {
        let req = Requirements::default().allow_actor("u1");
        assert_eq!(
            authorize(&req, false, &moderator(), &StaticContext::direct()),
            Err(PermissionDenied::ActorRestrictedInDirect)
        );
    }

    #[test]
    fn guild_only_rejects_direct() {
        let req = Requirements::default();
        assert_eq!(
            authorize(&req, true, &moderator(), &StaticContext::direct()),
            Err(PermissionDenied::GuildOnly)
        );
        assert!(authorize(&req, true, &moderator(), &guild()).is_ok());
    }

    #[test]
    fn direct_skips_capability_and_role_rules() {
        let req = Requirements::default()
            .require_capability("administrator", true)
            .allow_group_name("Moderators");
        assert!(authorize(&req, false, &StaticActor::new("x"), &StaticContext::direct()).is_ok());
    }

    #[rstest]
    #[case(Some(true), true)]
    #[case(Some(false), false)]
    #[case(None, false)]
    fn capability_must_match_exactly(#[case] held: Option<bool>, #[case] allowed: bool) {
        let req = Requirements::default().require_capability("manage_messages", true);
        let mut ctx = guild().with_capability("administrator", true);
        if let Some(value) = held {
            ctx = ctx.with_capability("manage_messages", value);
        }
        assert_eq!(authorize(&req, false, &moderator(), &ctx).is_ok(), allowed);
    }

    #[test]
    fn capability_required_false() {
        let req = Requirements::default().require_capability("muted", false);
        assert!(authorize(&req, false, &moderator(), &guild()).is_ok());
        assert_eq!(
            authorize(&req, false, &moderator(), &guild().with_capability("muted", true)),
            Err(PermissionDenied::CapabilitiesMismatch)
        );
    }

    #[test]
    fn capability_match_bypasses_roles() {
        let req = Requirements::default()
            .require_capability("administrator", true)
            .allow_group_id("r-owner");
        let ctx = guild().with_capability("administrator", true);
        assert!(authorize(&req, false, &StaticActor::new("x"), &ctx).is_ok());
    }

    #[test]
    fn roles_grant_when_capabilities_miss() {
        let req = Requirements::default()
            .require_capability("administrator", true)
            .allow_group_id("r-mod");
        assert!(authorize(&req, false, &moderator(), &guild()).is_ok());
        assert_eq!(
            authorize(&req, false, &StaticActor::new("x"), &guild()),
            Err(PermissionDenied::RolesNotAllowed)
        );
    }

    #[rstest]
    #[case("r-mod", true)]
    #[case("r-member", false)]
    #[case("r-unknown", false)]
    fn role_ids(#[case] role: &str, #[case] allowed: bool) {
        let req = Requirements::default().allow_group_id("r-mod");
        let actor = StaticActor::new("x").with_role(role);
        assert_eq!(authorize(&req, false, &actor, &guild()).is_ok(), allowed);
    }

    #[rstest]
    #[case("r-mod", true)]
    #[case("r-member", false)]
    #[case("r-unknown", false)]
    fn role_names(#[case] role: &str, #[case] allowed: bool) {
        let req = Requirements::default().allow_group_name("Moderators");
        let actor = StaticActor::new("x").with_role(role);
        assert_eq!(authorize(&req, false, &actor, &guild()).is_ok(), allowed);
    }

    #[test]
    fn role_id_miss_falls_through_to_names() {
        let req = Requirements::default()
            .allow_group_id("r-owner")
            .allow_group_name("Members");
        let actor = StaticActor::new("x").with_role("r-member");
        assert!(authorize(&req, false, &actor, &guild()).is_ok());
        assert_eq!(
            authorize(&req, false, &moderator(), &guild()),
            Err(PermissionDenied::RolesNotAllowed)
        );
    }

    #[test]
    fn deserialize_partial() {
        let req: Requirements =
            serde_json::from_str(r#"{"capabilities": {"manage_messages": true}}"#).unwrap();
        assert_eq!(req.capabilities.get("manage_messages"), Some(&true));
        assert!(req.allowed_actor_ids.is_empty());
    }
}
