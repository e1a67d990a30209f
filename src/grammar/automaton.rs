use std::collections::HashMap;

use super::Symbol;

/// SLR(1) transition and reduction tables, both keyed by `(state, symbol)`.
#[derive(Clone, Debug, Default)]
pub struct Automaton {
    transitions: HashMap<(usize, Symbol), usize>,
    reductions: HashMap<(usize, Symbol), usize>,
}

impl Automaton {
    pub const START: usize = 0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transition(&mut self, state: usize, symbol: Symbol, next: usize) {
        self.transitions.insert((state, symbol), next);
    }

    pub fn add_reduction(&mut self, state: usize, lookahead: Symbol, rule: usize) {
        self.reductions.insert((state, lookahead), rule);
    }

    pub fn transition(&self, state: usize, symbol: Symbol) -> Option<usize> {
        self.transitions.get(&(state, symbol)).copied()
    }

    pub fn reduction(&self, state: usize, lookahead: Symbol) -> Option<usize> {
        self.reductions.get(&(state, lookahead)).copied()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn reduction_count(&self) -> usize {
        self.reductions.len()
    }

    pub(super) fn referenced_rules(&self) -> impl Iterator<Item = usize> + '_ {
        self.reductions.values().copied()
    }
}
