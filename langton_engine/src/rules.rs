use crate::error::RuleError;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Represents how an ant turns before leaving a cell.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Turn {
    /// Rotate 90 degrees counter-clockwise.
    Left,
    /// Keep the current heading.
    Straight,
    /// Rotate 90 degrees clockwise.
    Right,
    /// Reverse the current heading.
    UTurn,
}

impl Turn {
    /// The numeric encoding used by agent descriptors.
    pub fn value(self) -> i64 {
        match self {
            Turn::Left => -1,
            Turn::Straight => 0,
            Turn::Right => 1,
            Turn::UTurn => 2,
        }
    }

    pub fn from_value(value: i64) -> Option<Turn> {
        match value {
            -1 => Some(Turn::Left),
            0 => Some(Turn::Straight),
            1 => Some(Turn::Right),
            2 => Some(Turn::UTurn),
            _ => None,
        }
    }
}

impl Distribution<Turn> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Turn {
        match rng.gen_range(0..4) {
            0 => Turn::Left,
            1 => Turn::Straight,
            2 => Turn::Right,
            _ => Turn::UTurn,
        }
    }
}

/// A single transition: on a cell in `current_state`, turn and repaint it with `next_cell_state`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rule {
    pub current_state: u32,
    pub turn: Turn,
    pub next_cell_state: u32,
}

impl Rule {
    pub fn new(current_state: u32, turn: Turn, next_cell_state: u32) -> Rule {
        Rule {
            current_state,
            turn,
            next_cell_state,
        }
    }
}

/// The wire form of a rule as it appears in agent descriptors.
///
/// Fields are signed so that negative states survive parsing and can be reported by [`validate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub current_state: i64,
    pub turn: i64,
    pub next_cell_state: i64,
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> RuleSpec {
        RuleSpec {
            current_state: rule.current_state as i64,
            turn: rule.turn.value(),
            next_cell_state: rule.next_cell_state as i64,
        }
    }
}

impl TryFrom<(usize, &RuleSpec)> for Rule {
    type Error = RuleError;

    fn try_from((index, spec): (usize, &RuleSpec)) -> Result<Rule, RuleError> {
        let current_state = state_value(index, "currentState", spec.current_state)?;
        let next_cell_state = state_value(index, "nextCellState", spec.next_cell_state)?;
        let turn = Turn::from_value(spec.turn).ok_or(RuleError::InvalidTurn {
            index,
            value: spec.turn,
        })?;

        Ok(Rule::new(current_state, turn, next_cell_state))
    }
}

fn state_value(index: usize, field: &'static str, value: i64) -> Result<u32, RuleError> {
    u32::try_from(value).map_err(|_| RuleError::NegativeState {
        index,
        field,
        value,
    })
}

/// Validates a rule set in its wire form.
///
/// An empty set is valid: the ant never finds a matching rule and only moves.
/// Duplicated current states are also accepted, the last one wins once processed.
pub fn validate(rules: &[RuleSpec]) -> Result<(), RuleError> {
    parse_rules(rules).map(|_| ())
}

/// Converts a rule set from its wire form into checked rules, preserving order.
pub fn parse_rules(rules: &[RuleSpec]) -> Result<Vec<Rule>, RuleError> {
    if rules.is_empty() {
        warn!("rule set is empty, the ant will move without painting");
    }

    let rules = rules
        .iter()
        .enumerate()
        .map(Rule::try_from)
        .collect::<Result<Vec<Rule>, RuleError>>()?;

    let processed = to_processed(&rules);
    if processed.len() < rules.len() {
        warn!(
            rules = rules.len(),
            distinct_states = processed.len(),
            "rule set repeats a current state, the last rule for each state wins"
        );
    }

    Ok(rules)
}

/// Builds the `current_state -> rule` lookup used at simulation time (last write wins).
pub fn to_processed(rules: &[Rule]) -> HashMap<u32, Rule> {
    rules
        .iter()
        .map(|rule| (rule.current_state, *rule))
        .collect()
}

/// Generates one rule per state in `0..num_states` with a random turn and next state.
pub fn generate_random<R: Rng + ?Sized>(num_states: usize, rng: &mut R) -> Vec<Rule> {
    let num_states = if num_states == 0 {
        warn!("cannot generate rules for 0 states, generating for 1 state");
        1
    } else {
        num_states
    };

    let rules = (0..num_states as u32)
        .map(|state| Rule::new(state, rng.gen(), rng.gen_range(0..num_states as u32)))
        .collect();
    debug!(num_states, "generated random rule set");

    rules
}

/// The standard two-state Langton's ant: turn right on 0, turn left on 1, flipping the cell.
pub fn default_rules() -> Vec<Rule> {
    vec![Rule::new(0, Turn::Right, 1), Rule::new(1, Turn::Left, 0)]
}

/// The transition function of a single ant.
///
/// Keeps the rules in their original order (for display and serialization)
/// alongside the processed lookup used when stepping.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleTable {
    rules: Vec<Rule>,
    processed: HashMap<u32, Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> RuleTable {
        let processed = to_processed(&rules);
        RuleTable { rules, processed }
    }

    pub fn from_specs(specs: &[RuleSpec]) -> Result<RuleTable, RuleError> {
        Ok(RuleTable::new(parse_rules(specs)?))
    }

    pub fn lookup(&self, state: u32) -> Option<&Rule> {
        self.processed.get(&state)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn processed(&self) -> &HashMap<u32, Rule> {
        &self.processed
    }

    pub fn specs(&self) -> Vec<RuleSpec> {
        self.rules.iter().copied().map(RuleSpec::from).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The largest state mentioned by any rule, either as current or next state.
    pub fn max_state(&self) -> Option<u32> {
        self.rules
            .iter()
            .flat_map(|rule| [rule.current_state, rule.next_cell_state])
            .max()
    }
}

impl Default for RuleTable {
    fn default() -> RuleTable {
        RuleTable::new(default_rules())
    }
}
