#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end dispatch through a small moderation command tree.

use std::{
    collections::BTreeSet,
    sync::{Arc, RwLock},
    thread,
};

use {
    herald_commands::{
        CommandNode, CommandOptions, Requirements, ResponseGenerator, StaticActor, StaticContext,
        tokenize,
    },
    rand::{SeedableRng, rngs::StdRng},
};

fn moderation_tree() -> CommandNode {
    let mut root = CommandNode::root(ResponseGenerator::computed(|_, args| {
        Ok(Some(match args.first() {
            Some(cmd) => format!("unknown command: {cmd}"),
            None => "usage: <command> [args]".to_string(),
        }))
    }));
    root.register_child(
        "ban",
        ResponseGenerator::computed(|inv, args| {
            Ok(Some(format!("{} banned {}", inv.actor.id(), args.join(" "))))
        }),
        CommandOptions::default()
            .alias("b")
            .guild_only(true)
            .requirements(Requirements::default().require_capability("manage_messages", true)),
    )
    .unwrap();
    root.register_child(
        "role",
        ResponseGenerator::computed(|_, args| Ok(Some(format!("role {}", args.join(" "))))),
        CommandOptions::default().case_insensitive(true),
    )
    .unwrap();
    root
}

fn moderator_ctx() -> StaticContext {
    StaticContext::group("g1")
        .with_capability("manage_messages", true)
        .with_capability("administrator", true)
}

#[test]
fn alias_and_label_give_identical_results() {
    let root = moderation_tree();
    let actor = StaticActor::new("mod1");
    let ctx = moderator_ctx();

    let by_label = root.process(&tokenize("ban user123"), &actor, &ctx).unwrap();
    let by_alias = root.process(&tokenize("b user123"), &actor, &ctx).unwrap();
    assert_eq!(by_label.as_deref(), Some("mod1 banned user123"));
    assert_eq!(by_label, by_alias);
}

#[test]
fn capability_rule_gates_execution() {
    let root = moderation_tree();
    let ban = root.child("ban").unwrap();
    let actor = StaticActor::new("u1");

    assert!(ban.process(&[], &actor, &moderator_ctx()).unwrap().is_some());

    let denied = StaticContext::group("g1").with_capability("manage_messages", false);
    assert_eq!(ban.process(&[], &actor, &denied).unwrap(), None);

    let missing = StaticContext::group("g1").with_capability("administrator", true);
    assert_eq!(ban.process(&[], &actor, &missing).unwrap(), None);
}

#[test]
fn guild_only_command_silent_in_dm() {
    let root = moderation_tree();
    let actor = StaticActor::new("mod1");
    let dm = StaticContext::direct().with_capability("manage_messages", true);
    assert_eq!(root.process(&tokenize("ban user123"), &actor, &dm).unwrap(), None);
}

#[test]
fn case_insensitive_child() {
    let root = moderation_tree();
    let actor = StaticActor::new("u1");
    let ctx = StaticContext::group("g1");
    let lower = root.process(&tokenize("role add"), &actor, &ctx).unwrap();
    let upper = root.process(&tokenize("ROLE add"), &actor, &ctx).unwrap();
    assert_eq!(lower.as_deref(), Some("role add"));
    assert_eq!(lower, upper);
}

#[test]
fn unmatched_token_runs_parent() {
    let root = moderation_tree();
    let actor = StaticActor::new("u1");
    let ctx = StaticContext::group("g1");
    assert_eq!(
        root.process(&tokenize("kick user123"), &actor, &ctx)
            .unwrap()
            .as_deref(),
        Some("unknown command: kick")
    );
    assert_eq!(
        root.process(&[], &actor, &ctx).unwrap().as_deref(),
        Some("usage: <command> [args]")
    );
}

#[test]
fn alias_removal_and_reregistration() {
    let mut root = moderation_tree();
    let actor = StaticActor::new("mod1");
    let ctx = moderator_ctx();

    root.unregister_child("b").unwrap();
    assert_eq!(
        root.process(&tokenize("b user123"), &actor, &ctx)
            .unwrap()
            .as_deref(),
        Some("unknown command: b")
    );
    assert!(root.process(&tokenize("ban user123"), &actor, &ctx).unwrap().is_some());

    root.register_alias("b", "ban").unwrap();
    assert_eq!(
        root.process(&tokenize("b user123"), &actor, &ctx)
            .unwrap()
            .as_deref(),
        Some("mod1 banned user123")
    );
}

#[test]
fn weighted_set_with_seeded_rng() {
    let mut root = CommandNode::root(ResponseGenerator::silent());
    root.register_child(
        "greet",
        ResponseGenerator::choice_of_texts(["hi", "hello", "hey"]),
        CommandOptions::default(),
    )
    .unwrap();
    let actor = StaticActor::new("u1");
    let ctx = StaticContext::group("g1");
    let tokens = tokenize("greet");

    let mut rng = StdRng::seed_from_u64(7);
    let seen: BTreeSet<String> = (0..1000)
        .filter_map(|_| {
            root.process_with_rng(&tokens, &actor, &ctx, &mut rng)
                .unwrap()
        })
        .collect();
    assert_eq!(seen.len(), 3);
}

#[test]
fn concurrent_readers_share_tree() {
    let tree = Arc::new(RwLock::new(moderation_tree()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                let actor = StaticActor::new(format!("mod{i}"));
                let guard = tree.read().unwrap();
                guard
                    .process(&tokenize("b someone"), &actor, &moderator_ctx())
                    .unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap().as_deref(),
            Some(format!("mod{i} banned someone").as_str())
        );
    }

    tree.write().unwrap().unregister_child("ban").unwrap();
    let guard = tree.read().unwrap();
    assert!(guard.child("ban").is_none());
}
