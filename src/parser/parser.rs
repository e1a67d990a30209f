use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::grammar::{Automaton, Grammar, Rule};
use crate::token::Token;

use super::Node;

/// Table-driven shift-reduce parser. `states` always holds one more entry
/// than `nodes`: the start state sits below the first shifted node.
#[derive(Debug)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    states: Vec<usize>,
    nodes: Vec<Node>,
    tokens: VecDeque<Token>,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, tokens: Vec<Token>) -> Self {
        let mut bracketed = VecDeque::with_capacity(tokens.len() + 2);
        bracketed.push_back(Token::bof());
        bracketed.extend(tokens);
        bracketed.push_back(Token::eof());

        Self {
            grammar,
            states: vec![Automaton::START],
            nodes: vec![],
            tokens: bracketed,
        }
    }

    /// Shifts and reduces until the input is exhausted.
    pub fn run(&mut self) -> Result<()> {
        while let Some(lookahead) = self.tokens.front().map(|token| token.kind) {
            while let Some(number) = self.grammar.automaton.reduction(self.top(), lookahead) {
                self.reduce(number)?;
            }
            self.shift()?;
        }
        debug!(nodes = self.nodes.len(), "input consumed");
        Ok(())
    }

    /// Collapses what is left on the stack with the whole-program rule.
    pub fn finish(mut self) -> Result<Node> {
        let rule = self.rule(0)?;
        if self.nodes.len() != rule.len() {
            return Err(Error::Incomplete(self.nodes.len()));
        }
        let children = std::mem::take(&mut self.nodes);
        Ok(Node::interior(rule, children))
    }

    fn top(&self) -> usize {
        self.states.last().copied().unwrap_or(Automaton::START)
    }

    fn rule(&self, number: usize) -> Result<Rule> {
        self.grammar
            .rule(number)
            .cloned()
            .ok_or_else(|| Error::load(0, format!("no rule numbered {number}")))
    }

    fn reduce(&mut self, number: usize) -> Result<()> {
        let rule = self.rule(number)?;
        let Some(at) = self.nodes.len().checked_sub(rule.len()) else {
            return Err(Error::Incomplete(self.nodes.len()));
        };

        let children = self.nodes.split_off(at);
        self.states.truncate(self.states.len() - rule.len());

        let state = self.top();
        let next = self
            .grammar
            .automaton
            .transition(state, rule.lhs)
            .ok_or(Error::Syntax {
                state,
                symbol: rule.lhs,
            })?;
        trace!(rule = %rule, state, next, "reduce");

        self.states.push(next);
        self.nodes.push(Node::interior(rule, children));
        Ok(())
    }

    fn shift(&mut self) -> Result<()> {
        let Some(token) = self.tokens.pop_front() else {
            return Ok(());
        };

        let state = self.top();
        let next = self
            .grammar
            .automaton
            .transition(state, token.kind)
            .ok_or(Error::Syntax {
                state,
                symbol: token.kind,
            })?;
        trace!(token = %token, state, next, "shift");

        self.states.push(next);
        self.nodes.push(Node::leaf(token));
        Ok(())
    }
}

/// Parses a token stream (without BOF/EOF) into a single program tree.
pub fn parse(grammar: &Grammar, tokens: Vec<Token>) -> Result<Node> {
    let mut parser = Parser::new(grammar, tokens);
    parser.run()?;
    parser.finish()
}
