use crate::config::{default_agent_configs, AgentConfig, DEFAULT_ANT_COLOR};
use crate::error::ConfigError;
use crate::rules::{RuleTable, Turn};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use tracing::debug;

/// Represents the direction an ant is facing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    /// The numeric encoding used by agent descriptors (`dir`).
    pub fn index(self) -> i64 {
        match self {
            Heading::Up => 0,
            Heading::Right => 1,
            Heading::Down => 2,
            Heading::Left => 3,
        }
    }

    pub fn from_index(index: i64) -> Option<Heading> {
        match index {
            0 => Some(Heading::Up),
            1 => Some(Heading::Right),
            2 => Some(Heading::Down),
            3 => Some(Heading::Left),
            _ => None,
        }
    }

    /// The heading after applying `turn`, in quarter turns clockwise.
    pub fn turned(self, turn: Turn) -> Heading {
        let quarter_turns = match turn {
            Turn::Straight => 0,
            Turn::Right => 1,
            Turn::UTurn => 2,
            Turn::Left => 3,
        };

        match (self.index() + quarter_turns) % 4 {
            0 => Heading::Up,
            1 => Heading::Right,
            2 => Heading::Down,
            _ => Heading::Left,
        }
    }

    /// The unit step taken when moving forward, with y growing downwards.
    pub fn displacement(self) -> (i64, i64) {
        match self {
            Heading::Up => (0, -1),
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
        }
    }
}

impl Distribution<Heading> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Heading {
        match rng.gen_range(0..4) {
            0 => Heading::Up,
            1 => Heading::Right,
            2 => Heading::Down,
            _ => Heading::Left,
        }
    }
}

/// An ant with its own rule table.
///
/// Its position is always inside `[0, grid_size)` on both axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Ant {
    id: String,
    x: usize,
    y: usize,
    heading: Heading,
    rules: RuleTable,
    color: String,
}

impl Ant {
    pub fn new(
        id: String,
        (x, y): (i64, i64),
        heading: Heading,
        rules: RuleTable,
        color: String,
        grid_size: usize,
    ) -> Ant {
        let mut ant = Ant {
            id,
            x: 0,
            y: 0,
            heading,
            rules,
            color,
        };
        ant.set_position(x, y, grid_size);

        ant
    }

    /// The standard ant: `ant_0` in the middle of the grid, facing up, with the default rules.
    pub fn default_for(grid_size: usize) -> Ant {
        let center = (grid_size / 2) as i64;

        Ant::new(
            "ant_0".to_string(),
            (center, center),
            Heading::Up,
            RuleTable::default(),
            DEFAULT_ANT_COLOR.to_string(),
            grid_size,
        )
    }

    /// Builds an ant from its descriptor, falling back to defaults for missing fields.
    ///
    /// # Arguments
    /// * `index` - The position of the descriptor, used for the default id and in errors.
    /// * `config` - The descriptor.
    /// * `grid_size` - The side length of the grid the ant lives on.
    pub fn from_config(
        index: usize,
        config: &AgentConfig,
        grid_size: usize,
    ) -> Result<Ant, ConfigError> {
        let center = (grid_size / 2) as i64;

        let heading = match config.dir {
            None => Heading::Up,
            Some(dir) => Heading::from_index(dir)
                .ok_or(ConfigError::InvalidHeading { agent: index, value: dir })?,
        };

        // A missing rule set means the standard ant, an empty one means an ant that never paints
        let rules = match &config.rules {
            None => RuleTable::default(),
            Some(specs) => RuleTable::from_specs(specs)
                .map_err(|source| ConfigError::InvalidRules { agent: index, source })?,
        };

        Ok(Ant::new(
            config
                .id
                .clone()
                .unwrap_or_else(|| format!("ant_{}", index)),
            (config.x.unwrap_or(center), config.y.unwrap_or(center)),
            heading,
            rules,
            config
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_ANT_COLOR.to_string()),
            grid_size,
        ))
    }

    /// The descriptor describing this ant in its current state.
    pub fn to_config(&self) -> AgentConfig {
        AgentConfig {
            id: Some(self.id.clone()),
            x: Some(self.x as i64),
            y: Some(self.y as i64),
            dir: Some(self.heading.index()),
            rules: Some(self.rules.specs()),
            color: Some(self.color.clone()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Moves the ant, wrapping the coordinates around the grid.
    pub fn set_position(&mut self, x: i64, y: i64, grid_size: usize) {
        let size = grid_size.max(1) as i64;
        self.x = x.rem_euclid(size) as usize;
        self.y = y.rem_euclid(size) as usize;
    }

    pub fn set_heading(&mut self, heading: Heading) {
        self.heading = heading;
    }
}

/// Builds every ant from its descriptor, or the default ant when there are none.
///
/// Either all descriptors are valid and all ants are returned, or the first error is.
pub fn build_agents(configs: &[AgentConfig], grid_size: usize) -> Result<Vec<Ant>, ConfigError> {
    let defaults;
    let configs = if configs.is_empty() {
        defaults = default_agent_configs(grid_size);
        &defaults[..]
    } else {
        configs
    };

    let ants = configs
        .iter()
        .enumerate()
        .map(|(index, config)| Ant::from_config(index, config, grid_size))
        .collect::<Result<Vec<Ant>, ConfigError>>()?;
    debug!(ants = ants.len(), "built ants from configuration");

    Ok(ants)
}
