use crate::error::ConfigError;
use crate::geometry::Viewport;
use crate::palette::{random_hex_color, PaletteKind};
use crate::rules::{default_rules, generate_random, RuleSpec};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Side length of the grid when none is configured.
pub const DEFAULT_GRID_SIZE: usize = 500;

/// Body color of an ant whose descriptor has none.
pub const DEFAULT_ANT_COLOR: &str = "#FF4136";

/// Describes one ant as it appears in the JSON configuration.
///
/// Every field is optional; missing fields fall back to defaults when the ant is built.
/// Absent fields are also omitted when serializing so that a round trip keeps the text intact.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    /// Heading: 0 up, 1 right, 2 down, 3 left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Settings for a simulation session and its editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid_size: usize,
    pub steps_per_tick: usize,
    /// Seed for random rule and configuration generation. Uses entropy when `None`.
    pub seed: Option<u64>,
    pub palette: PaletteKind,
    /// Size of the rule editor canvas.
    pub viewport: Viewport,
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            grid_size: DEFAULT_GRID_SIZE,
            steps_per_tick: 1,
            seed: None,
            palette: PaletteKind::Default,
            viewport: Viewport::new(600.0, 400.0),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(contents: &str) -> Result<SimulationConfig, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        SimulationConfig::from_json_str(&contents)
    }
}

/// Parses the agent configuration text. The top-level value must be an array.
pub fn parse_agent_configs(contents: &str) -> Result<Vec<AgentConfig>, ConfigError> {
    parse_json_array(contents)
}

/// Parses a bare rule array, as exchanged with the rule editor.
pub fn parse_rule_specs(contents: &str) -> Result<Vec<RuleSpec>, ConfigError> {
    parse_json_array(contents)
}

/// Serializes agent descriptors as pretty-printed JSON.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn parse_json_array<T: DeserializeOwned>(contents: &str) -> Result<Vec<T>, ConfigError> {
    let value: Value = serde_json::from_str(contents)?;

    if !value.is_array() {
        return Err(ConfigError::NotAnArray {
            found: json_kind(&value),
        });
    }

    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The configuration used when none is given: one centered ant with the standard rules.
pub fn default_agent_configs(grid_size: usize) -> Vec<AgentConfig> {
    let center = (grid_size / 2) as i64;

    vec![AgentConfig {
        id: Some("ant_0".to_string()),
        x: Some(center),
        y: Some(center),
        dir: Some(0),
        rules: Some(default_rules().into_iter().map(RuleSpec::from).collect()),
        color: Some(DEFAULT_ANT_COLOR.to_string()),
    }]
}

/// Generates `num_ants` ants that all share one random rule set over `num_states` states.
pub fn generate_shared_ruleset<R: Rng + ?Sized>(
    num_ants: usize,
    num_states: usize,
    grid_size: usize,
    rng: &mut R,
) -> Vec<AgentConfig> {
    let (num_ants, num_states) = sanitize_counts(num_ants, num_states);
    let rules: Vec<RuleSpec> = generate_random(num_states, rng)
        .into_iter()
        .map(RuleSpec::from)
        .collect();

    (0..num_ants)
        .map(|i| random_agent(format!("rand_shared_ant_{}", i), rules.clone(), grid_size, rng))
        .collect()
}

/// Generates `num_ants` ants, each with its own random rule set over `num_states` states.
pub fn generate_unique_rulesets<R: Rng + ?Sized>(
    num_ants: usize,
    num_states: usize,
    grid_size: usize,
    rng: &mut R,
) -> Vec<AgentConfig> {
    let (num_ants, num_states) = sanitize_counts(num_ants, num_states);

    (0..num_ants)
        .map(|i| {
            let rules = generate_random(num_states, rng)
                .into_iter()
                .map(RuleSpec::from)
                .collect();
            random_agent(format!("gen_unique_ant_{}", i), rules, grid_size, rng)
        })
        .collect()
}

fn sanitize_counts(num_ants: usize, num_states: usize) -> (usize, usize) {
    let num_ants = if num_ants == 0 {
        warn!("invalid number of ants for generation, defaulting to 1");
        1
    } else {
        num_ants
    };
    let num_states = if num_states == 0 {
        warn!("invalid number of states for generation, defaulting to 2");
        2
    } else {
        num_states
    };

    (num_ants, num_states)
}

fn random_agent<R: Rng + ?Sized>(
    id: String,
    rules: Vec<RuleSpec>,
    grid_size: usize,
    rng: &mut R,
) -> AgentConfig {
    // Keep generated ants within the central 80% of the grid
    let size = grid_size as f64;
    let coordinate = |rng: &mut R| (rng.gen::<f64>() * size * 0.8 + size * 0.1) as i64;
    let x = coordinate(rng);
    let y = coordinate(rng);

    AgentConfig {
        id: Some(id),
        x: Some(x),
        y: Some(y),
        dir: Some(rng.gen_range(0..4)),
        rules: Some(rules),
        color: Some(random_hex_color(rng)),
    }
}
