use crate::error::{Error, Result};

use super::{rule::EMPTY_MARKER, Automaton, Rule, Symbol};

/// Yields `(line number, fields)` for every data line, skipping the header
/// line and blank lines.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .skip(1)
        .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, fields)| !fields.is_empty())
}

fn symbol(line: usize, name: &str) -> Result<Symbol> {
    Symbol::from_name(name).ok_or_else(|| Error::load(line, format!("unknown symbol {name}")))
}

fn number(line: usize, field: &str) -> Result<usize> {
    field
        .parse()
        .map_err(|_| Error::load(line, format!("expected a number, found {field}")))
}

/// `lhs rhs...` per line; `.EMPTY` stands for an empty right-hand side.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>> {
    let mut rules = vec![];

    for (line, fields) in data_lines(text) {
        let lhs = symbol(line, fields[0])?;
        if lhs.is_terminal() {
            return Err(Error::load(line, format!("{lhs} cannot be a left-hand side")));
        }

        let rhs = fields[1..]
            .iter()
            .filter(|&&field| field != EMPTY_MARKER)
            .map(|field| symbol(line, field))
            .collect::<Result<Vec<_>>>()?;
        rules.push(Rule::new(lhs, rhs));
    }

    Ok(rules)
}

fn expect_fields<'a>(line: usize, fields: &'a [&'a str]) -> Result<[&'a str; 3]> {
    match fields {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(Error::load(
            line,
            format!("expected 3 fields, found {}", fields.len()),
        )),
    }
}

/// `state symbol next-state` per line.
pub fn parse_transitions(text: &str, automaton: &mut Automaton) -> Result<()> {
    for (line, fields) in data_lines(text) {
        let [state, sym, next] = expect_fields(line, &fields)?;
        automaton.add_transition(number(line, state)?, symbol(line, sym)?, number(line, next)?);
    }
    Ok(())
}

/// `state rule-number lookahead` per line.
pub fn parse_reductions(text: &str, automaton: &mut Automaton) -> Result<()> {
    for (line, fields) in data_lines(text) {
        let [state, rule, lookahead] = expect_fields(line, &fields)?;
        let lookahead = symbol(line, lookahead)?;
        if !lookahead.is_terminal() {
            return Err(Error::load(
                line,
                format!("lookahead {lookahead} is not a terminal"),
            ));
        }
        automaton.add_reduction(number(line, state)?, lookahead, number(line, rule)?);
    }
    Ok(())
}
