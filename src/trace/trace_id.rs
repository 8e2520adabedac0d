//! Trace identifier with nesting level.

use uuid::Uuid;

const FIRST_LEVEL: u32 = 1;

/// Identifier shared by every span of one logical call chain.
///
/// `level` starts at 1 for the outermost span and tracks the current
/// nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId {
    id: String,
    level: u32,
}

impl TraceId {
    /// Create a first-level trace with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: FIRST_LEVEL,
        }
    }

    /// Create a first-level trace, reusing `seed` when present and
    /// generating a time-ordered UUID otherwise.
    pub fn generate(seed: Option<&str>) -> Self {
        match seed {
            Some(seed) if !seed.is_empty() => Self::new(seed),
            _ => Self::new(Uuid::now_v7().to_string()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_first_level(&self) -> bool {
        self.level == FIRST_LEVEL
    }

    pub(crate) fn next_level(&mut self) {
        self.level += 1;
    }

    pub(crate) fn prev_level(&mut self) {
        if self.level > FIRST_LEVEL {
            self.level -= 1;
        }
    }
}
