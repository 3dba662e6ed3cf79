//! Error types for the engine, the configuration boundary and the rule editor.

use thiserror::Error;

/// Errors reported when validating a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A rule references a negative cell state.
    #[error("rule {index}: {field} must be non-negative, got {value}")]
    NegativeState {
        /// Position of the rule in its set.
        index: usize,
        /// Either `currentState` or `nextCellState`.
        field: &'static str,
        /// The offending value.
        value: i64,
    },

    /// A rule uses a turn outside of {-1, 0, 1, 2}.
    #[error("rule {index}: turn must be one of -1, 0, 1 or 2, got {value}")]
    InvalidTurn {
        /// Position of the rule in its set.
        index: usize,
        /// The offending value.
        value: i64,
    },
}

/// Errors raised while reading agent descriptors or simulation settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The text is not valid JSON or does not have the expected shape.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The top-level JSON value is not an array.
    #[error("configuration must be a JSON array, got {found}")]
    NotAnArray {
        /// Kind of JSON value that was found instead.
        found: &'static str,
    },

    /// An agent carries a rule set that fails validation.
    #[error("agent {agent} has an invalid rule set: {source}")]
    InvalidRules {
        /// Index of the agent descriptor.
        agent: usize,
        /// The underlying rule error.
        #[source]
        source: RuleError,
    },

    /// An agent heading is not one of 0 (up), 1 (right), 2 (down) or 3 (left).
    #[error("agent {agent}: dir must be between 0 and 3, got {value}")]
    InvalidHeading {
        /// Index of the agent descriptor.
        agent: usize,
        /// The offending value.
        value: i64,
    },

    /// A settings file could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by rule-graph editing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// A new state node would not fit on the canvas.
    #[error("state {id} would be placed off canvas")]
    OffCanvas {
        /// Id the node would have received.
        id: u32,
    },

    /// The last state already has the largest possible id.
    #[error("no state can follow state {last}")]
    StateLimit {
        /// Id of the last state.
        last: u32,
    },

    /// The operation needs a selected node.
    #[error("no state selected")]
    NoSelection,

    /// No node with this id exists.
    #[error("state {0} not found")]
    NodeNotFound(u32),

    /// No edge with this id exists.
    #[error("transition {0} not found")]
    EdgeNotFound(String),

    /// There is no pending transition to confirm.
    #[error("no pending transition")]
    NoPendingEdge,

    /// The next cell state of a transition must equal its target endpoint.
    #[error("next cell state {got} does not match the transition target {expected}")]
    EndpointMismatch {
        /// The edge's target state.
        expected: u32,
        /// The value that was supplied.
        got: u32,
    },
}
