use crate::agents::{build_agents, Ant, Heading};
use crate::config::{AgentConfig, SimulationConfig};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::palette::Palette;
use crate::render::Renderer;
use tracing::{debug, info};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Whether the host should advance the simulation on each frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunState {
    Stopped,
    Running,
}

/// A snapshot of one ant, for hosts that should not hold references into the session.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "python", pyclass(name = "Ant", module = "langton_engine", get_all))]
pub struct AgentState {
    /// The unique identifier of the ant.
    pub id: String,
    /// The column of the ant.
    pub x: usize,
    /// The row of the ant.
    pub y: usize,
    /// 0 up, 1 right, 2 down, 3 left.
    pub dir: i64,
    /// The state of the cell under the ant.
    pub cell_state: u32,
    /// The body color of the ant.
    pub color: String,
}

/// One simulation: a toroidal grid and the ants walking on it.
///
/// All mutation happens synchronously through `&mut self`; a host drives it by calling
/// [`SimulationSession::frame`] from its animation loop.
pub struct SimulationSession {
    grid: Grid,
    ants: Vec<Ant>,
    run_state: RunState,
    steps_per_tick: usize,
    ticks: u64,
}

impl SimulationSession {
    /// Creates a stopped session with the default ant.
    pub fn new(config: &SimulationConfig) -> SimulationSession {
        let grid = Grid::new(config.grid_size);
        let ants = vec![Ant::default_for(grid.size())];

        let mut session = SimulationSession {
            grid,
            ants,
            run_state: RunState::Stopped,
            steps_per_tick: 1,
            ticks: 0,
        };
        session.set_steps_per_tick(config.steps_per_tick);

        session
    }

    /// Replaces all ants and wipes the grid.
    ///
    /// An empty slice builds the default ant. If any descriptor is invalid nothing changes
    /// and the error is returned.
    pub fn initialize(&mut self, configs: &[AgentConfig]) -> Result<(), ConfigError> {
        let ants = build_agents(configs, self.grid.size())?;

        self.ants = ants;
        self.grid.reset();
        self.ticks = 0;
        info!(ants = self.ants.len(), "simulation initialized, grid cleared");

        Ok(())
    }

    /// Back to the default ant on an empty grid, stopped.
    pub fn reset(&mut self) {
        self.stop();
        self.ants = vec![Ant::default_for(self.grid.size())];
        self.grid.reset();
        self.ticks = 0;
        info!("simulation reset to the default ant");
    }

    pub fn start(&mut self) {
        if self.run_state == RunState::Running {
            return;
        }

        self.run_state = RunState::Running;
        debug!("simulation started");
    }

    pub fn stop(&mut self) {
        if self.run_state == RunState::Stopped {
            return;
        }

        self.run_state = RunState::Stopped;
        debug!(ticks = self.ticks, "simulation stopped");
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Sets how many sweeps over all ants happen per frame. Values below 1 become 1.
    pub fn set_steps_per_tick(&mut self, steps: usize) {
        self.steps_per_tick = steps.max(1);
    }

    pub fn steps_per_tick(&self) -> usize {
        self.steps_per_tick
    }

    /// Runs one sweep: every ant, in order, applies its rule and moves.
    ///
    /// Works regardless of the run state so that a stopped simulation can be single-stepped.
    pub fn step(&mut self) {
        for ant in self.ants.iter_mut() {
            apply_rule(ant, &mut self.grid);
        }
        self.ticks += 1;
    }

    /// Advances a running simulation by `steps_per_tick` sweeps and redraws it.
    ///
    /// Returns whether the simulation advanced. A stopped simulation is neither advanced nor drawn.
    pub fn frame(&mut self, renderer: &mut dyn Renderer, palette: &dyn Palette) -> bool {
        if !self.is_running() {
            return false;
        }

        for _ in 0..self.steps_per_tick {
            self.step();
        }
        renderer.draw_frame(self, palette);

        true
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// Number of sweeps since the last initialization.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// The largest state either painted on the grid or mentioned by any ant's rules.
    pub fn max_state(&self) -> u32 {
        self.ants
            .iter()
            .filter_map(|ant| ant.rules().max_state())
            .fold(self.grid.max_state(), u32::max)
    }

    /// The descriptors of the current ants, e.g. to export a running configuration.
    pub fn agent_configs(&self) -> Vec<AgentConfig> {
        self.ants.iter().map(Ant::to_config).collect()
    }

    pub fn agent_states(&self) -> Vec<AgentState> {
        self.ants
            .iter()
            .map(|ant| {
                let (x, y) = ant.position();
                AgentState {
                    id: ant.id().to_string(),
                    x,
                    y,
                    dir: ant.heading().index(),
                    cell_state: self.grid.get(x as i64, y as i64),
                    color: ant.color().to_string(),
                }
            })
            .collect()
    }
}

/// Applies one ant's rule to the cell under it and moves it one cell forward.
///
/// Without a rule for the current state the cell is left alone and the ant keeps its heading,
/// but it still moves.
fn apply_rule(ant: &mut Ant, grid: &mut Grid) {
    let (x, y) = ant.position();
    let (x, y) = (x as i64, y as i64);
    let state = grid.get(x, y);

    let heading: Heading = match ant.rules().lookup(state).copied() {
        Some(rule) => {
            grid.set(x, y, rule.next_cell_state);
            ant.heading().turned(rule.turn)
        }
        None => ant.heading(),
    };
    ant.set_heading(heading);

    let (dx, dy) = heading.displacement();
    ant.set_position(x + dx, y + dy, grid.size());
}
