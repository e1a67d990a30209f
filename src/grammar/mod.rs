mod automaton;
mod loader;
mod rule;
mod symbol;

pub use automaton::*;
pub use loader::*;
pub use rule::*;
pub use symbol::*;

use tracing::debug;

use crate::error::{Error, Result};

pub const BUILTIN_RULES: &str = include_str!("../../data/wlp4.cfg");
pub const BUILTIN_TRANSITIONS: &str = include_str!("../../data/wlp4.transitions");
pub const BUILTIN_REDUCTIONS: &str = include_str!("../../data/wlp4.reductions");

/// The production list together with the automaton that recognises it.
/// Rule 0 is the whole-program rule.
#[derive(Clone, Debug)]
pub struct Grammar {
    pub rules: Vec<Rule>,
    pub automaton: Automaton,
}

impl Grammar {
    pub fn load(rules: &str, transitions: &str, reductions: &str) -> Result<Self> {
        let rules = parse_rules(rules)?;
        if rules.is_empty() {
            return Err(Error::load(1, "production list is empty"));
        }

        let mut automaton = Automaton::new();
        parse_transitions(transitions, &mut automaton)?;
        parse_reductions(reductions, &mut automaton)?;

        if let Some(rule) = automaton.referenced_rules().find(|&r| r >= rules.len()) {
            return Err(Error::load(
                0,
                format!("reduction names rule {rule}, only {} exist", rules.len()),
            ));
        }

        debug!(
            rules = rules.len(),
            transitions = automaton.transition_count(),
            reductions = automaton.reduction_count(),
            "loaded grammar"
        );
        Ok(Self { rules, automaton })
    }

    pub fn builtin() -> Result<Self> {
        Self::load(BUILTIN_RULES, BUILTIN_TRANSITIONS, BUILTIN_REDUCTIONS)
    }

    pub fn rule(&self, number: usize) -> Option<&Rule> {
        self.rules.get(number)
    }
}
