//! Hierarchical command dispatch for chat messages.
//!
//! A tree of [`CommandNode`]s maps a tokenized message (`label arg arg ...`)
//! to a response generator, descending through subcommands and gating every
//! execution behind the node's [`Requirements`].
//!
//! Resolution at each level:
//! 1. Alias table (exact match)
//! 2. Child label (exact match)
//! 3. Child label (case-insensitive, only for children that opted in)
//! 4. No match: the current node runs with the remaining tokens as arguments

pub mod context;
pub mod error;
pub mod generator;
pub mod node;
pub mod permission;

pub use {
    context::{Actor, Invocation, InvocationContext, StaticActor, StaticContext},
    error::{BoxError, Error, Result},
    generator::{Handler, HandlerResult, ResponseGenerator, handler},
    node::{CommandNode, CommandOptions, tokenize},
    permission::{PermissionDenied, Requirements},
};
