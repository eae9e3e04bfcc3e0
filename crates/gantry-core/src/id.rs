//! Strongly-typed identifiers.

use std::fmt;

/// Identifies one entity within a world's registry.
///
/// Entity IDs are allocated sequentially by the runner that owns the
/// world, starting at 1, and are never reused within a runner's
/// lifetime. An ID is only meaningful together with the world index it
/// was obtained from; the server's dispatch API keeps the two paired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub u64);

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Entity {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
