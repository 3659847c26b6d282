use std::sync::Arc;

use rand::{Rng, seq::IndexedRandom};

use crate::{context::Invocation, error::BoxError};

/// Outcome of a handler: `Some(text)` to reply, `None` to stay silent.
pub type HandlerResult = Result<Option<String>, BoxError>;

/// A computed response, called with the invocation and the leftover tokens.
pub type Handler = Arc<dyn Fn(&Invocation<'_>, &[String]) -> HandlerResult + Send + Sync>;

/// What a command produces when it is the final match.
#[derive(Clone)]
pub enum ResponseGenerator {
    /// Always the same reply.
    FixedText(String),
    /// Reply computed per call.
    Computed(Handler),
    /// One member drawn uniformly at random on every call.
    WeightedSet(Vec<Handler>),
}

impl ResponseGenerator {
    pub fn text(text: impl Into<String>) -> Self {
        Self::FixedText(text.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>, &[String]) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Computed(handler(f))
    }

    pub fn weighted(handlers: impl IntoIterator<Item = Handler>) -> Self {
        Self::WeightedSet(handlers.into_iter().collect())
    }

    /// A weighted set whose members each return one of `texts`.
    pub fn choice_of_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::weighted(texts.into_iter().map(|text| {
            let text: String = text.into();
            handler(move |_, _| Ok(Some(text.clone())))
        }))
    }

    /// Never replies. Used by commands that only group subcommands.
    pub fn silent() -> Self {
        Self::computed(|_, _| Ok(None))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FixedText(_) => "fixed_text",
            Self::Computed(_) => "computed",
            Self::WeightedSet(_) => "weighted_set",
        }
    }

    pub(crate) fn is_empty_set(&self) -> bool {
        matches!(self, Self::WeightedSet(set) if set.is_empty())
    }

    /// Produce a reply. Weighted sets draw from `rng` on every call.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        invocation: &Invocation<'_>,
        args: &[String],
        rng: &mut R,
    ) -> HandlerResult {
        match self {
            Self::FixedText(text) => Ok(Some(text.clone())),
            Self::Computed(f) => f(invocation, args),
            Self::WeightedSet(set) => match set.choose(rng) {
                Some(f) => f(invocation, args),
                None => Ok(None),
            },
        }
    }
}

/// Wrap a closure as a shareable [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Invocation<'_>, &[String]) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

impl From<&str> for ResponseGenerator {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for ResponseGenerator {
    fn from(text: String) -> Self {
        Self::FixedText(text)
    }
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedText(text) => f.debug_tuple("FixedText").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
            Self::WeightedSet(set) => write!(f, "WeightedSet({} members)", set.len()),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::context::{StaticActor, StaticContext},
        rand::{SeedableRng, rngs::StdRng},
        std::collections::BTreeMap,
    };

    fn run(generator: &ResponseGenerator, args: &[String], rng: &mut StdRng) -> Option<String> {
        let actor = StaticActor::new("u1");
        let ctx = StaticContext::group("g1");
        let inv = Invocation {
            actor: &actor,
            context: &ctx,
            path: &["cmd"],
        };
        generator.generate(&inv, args, rng).unwrap()
    }

    #[test]
    fn fixed_text_ignores_args() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = ResponseGenerator::from("pong");
        assert_eq!(run(&g, &["x".into()], &mut rng).as_deref(), Some("pong"));
    }

    #[test]
    fn computed_sees_args_and_invocation() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = ResponseGenerator::computed(|inv, args| {
            Ok(Some(format!("{} {} {}", inv.actor.id(), inv.command(), args.join(","))))
        });
        assert_eq!(
            run(&g, &["a".into(), "b".into()], &mut rng).as_deref(),
            Some("u1 cmd a,b")
        );
    }

    #[test]
    fn computed_may_stay_silent() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(run(&ResponseGenerator::silent(), &[], &mut rng), None);
    }

    #[test]
    fn weighted_set_draws_every_member() {
        let mut rng = StdRng::seed_from_u64(42);
        let g = ResponseGenerator::choice_of_texts(["one", "two", "three"]);
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        for _ in 0..1000 {
            let reply = run(&g, &[], &mut rng).unwrap();
            *seen.entry(reply).or_default() += 1;
        }
        assert_eq!(seen.len(), 3);
        assert!(seen.values().all(|&n| n > 0));
    }

    #[test]
    fn handler_errors_propagate() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = ResponseGenerator::computed(|_, _| Err("boom".into()));
        let actor = StaticActor::new("u1");
        let ctx = StaticContext::direct();
        let inv = Invocation {
            actor: &actor,
            context: &ctx,
            path: &[],
        };
        let err = g.generate(&inv, &[], &mut rng).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn kind_and_empty_set() {
        assert_eq!(ResponseGenerator::text("x").kind(), "fixed_text");
        assert_eq!(ResponseGenerator::silent().kind(), "computed");
        assert!(ResponseGenerator::weighted(Vec::new()).is_empty_set());
        assert!(!ResponseGenerator::choice_of_texts(["a"]).is_empty_set());
    }
}
