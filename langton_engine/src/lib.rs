//! # langton_engine
//!
//! A multi-ant Langton's Ant engine on a toroidal grid, with a visual rule-graph editor.
//! Every ant carries its own transition table mapping cell states to a turn and a new state.

pub mod agents;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod palette;
pub mod render;
pub mod rules;
pub mod simulation;
pub mod translator;
pub mod workbench;

#[cfg(feature = "python")]
mod python;

pub use agents::{Ant, Heading};
pub use config::{AgentConfig, SimulationConfig};
pub use editor::{Interaction, PendingEdge, RuleGraphEditor, Selection, StateNode, TransitionEdge};
pub use error::{ConfigError, EditorError, RuleError};
pub use geometry::{Point, Viewport};
pub use grid::Grid;
pub use palette::{Palette, PaletteKind, StatePalette};
pub use render::{Renderer, TerminalRenderer};
pub use rules::{Rule, RuleSpec, RuleTable, Turn};
pub use simulation::{AgentState, RunState, SimulationSession};
pub use translator::RuleGraph;
pub use workbench::Workbench;
