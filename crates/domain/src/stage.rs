//! Setup stages: the two-phase priority ordering applied at bootstrap.
//!
//! Stage 1 holds a fixed allowlist of foundational domains; every other
//! configured domain belongs to stage 2. All stage-1 setups settle before
//! any stage-2 setup is created.

use std::collections::BTreeSet;
use std::fmt;

/// Domains that must finish setup before anything else starts.
pub const STAGE_1_DOMAINS: [&str; 5] = [
    "recorder",
    "mqtt",
    "mqtt_eventstream",
    "logger",
    "introduction",
];

/// A bootstrap stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    One,
    Two,
}

impl Stage {
    /// Return the stage `domain` is scheduled in.
    #[must_use]
    pub fn of(domain: &str) -> Self {
        if STAGE_1_DOMAINS.contains(&domain) {
            Self::One
        } else {
            Self::Two
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("stage 1"),
            Self::Two => f.write_str("stage 2"),
        }
    }
}

/// Split `domains` into the stage-1 and stage-2 batches.
#[must_use]
pub fn partition<I, S>(domains: I) -> (BTreeSet<String>, BTreeSet<String>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    domains
        .into_iter()
        .map(Into::into)
        .partition(|domain| Stage::of(domain) == Stage::One)
}
