//! Wording used in hint explanations.
//!
//! Front ends that re-skin the game (calling walls "firewalls", say) implement
//! [`Terminology`] and hand it to [`crate::HintEngine::with_terms`] once. Every
//! method has a default, so an implementation only overrides what it renames.

use crate::grid::Mark;

pub trait Terminology: Send + Sync {
    fn wall(&self) -> &str {
        "wall"
    }

    fn walls(&self) -> &str {
        "walls"
    }

    fn path(&self) -> &str {
        "path"
    }

    fn paths(&self) -> &str {
        "paths"
    }

    fn dead_end(&self) -> &str {
        "dead end"
    }

    fn dead_ends(&self) -> &str {
        "dead ends"
    }

    fn vault(&self) -> &str {
        "vault"
    }

    fn fork(&self) -> &str {
        "fork"
    }

    fn mark(&self, mark: Mark) -> &str {
        match mark {
            Mark::Wall => self.wall(),
            Mark::Path => self.path(),
        }
    }
}

/// The built-in wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTerms;

impl Terminology for StandardTerms {}
