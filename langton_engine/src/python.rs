use crate::config::{parse_agent_configs, to_pretty_json, SimulationConfig, DEFAULT_GRID_SIZE};
use crate::error::ConfigError;
use crate::simulation::{AgentState, SimulationSession};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// A simulation session, driven from Python.
#[pyclass(name = "Simulation", module = "langton_engine")]
pub struct Simulation {
    session: SimulationSession,
}

#[pymethods]
impl Simulation {
    /// Creates a stopped simulation.
    ///
    /// # Arguments
    /// * `grid_size` - The side length of the grid.
    /// * `steps_per_tick` - The number of sweeps run by each call to `tick`.
    /// * `config_json` - A JSON array of ant descriptors. If `None`, the default ant is used.
    #[new]
    #[pyo3(signature = (grid_size=DEFAULT_GRID_SIZE, steps_per_tick=1, config_json=None))]
    pub fn new(
        grid_size: usize,
        steps_per_tick: usize,
        config_json: Option<&str>,
    ) -> PyResult<Simulation> {
        let mut session = SimulationSession::new(&SimulationConfig {
            grid_size,
            steps_per_tick,
            ..SimulationConfig::default()
        });

        if let Some(contents) = config_json {
            let configs = parse_agent_configs(contents).map_err(to_py_err)?;
            session.initialize(&configs).map_err(to_py_err)?;
        }

        Ok(Simulation { session })
    }

    /// Replaces all ants with the ones described by `config_json` and clears the grid.
    pub fn initialize(&mut self, config_json: &str) -> PyResult<()> {
        let configs = parse_agent_configs(config_json).map_err(to_py_err)?;
        self.session.initialize(&configs).map_err(to_py_err)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn start(&mut self) {
        self.session.start();
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn set_steps_per_tick(&mut self, steps: usize) {
        self.session.set_steps_per_tick(steps);
    }

    /// Runs `sweeps` sweeps, whether the simulation is running or not.
    #[pyo3(signature = (sweeps=1))]
    pub fn step(&mut self, sweeps: usize) {
        for _ in 0..sweeps {
            self.session.step();
        }
    }

    /// Runs one frame worth of sweeps if the simulation is running.
    ///
    /// Returns whether the simulation advanced.
    pub fn tick(&mut self) -> bool {
        if !self.session.is_running() {
            return false;
        }

        for _ in 0..self.session.steps_per_tick() {
            self.session.step();
        }
        true
    }

    pub fn tick_count(&self) -> u64 {
        self.session.tick_count()
    }

    pub fn grid_size(&self) -> usize {
        self.session.grid().size()
    }

    pub fn cell(&self, x: i64, y: i64) -> u32 {
        self.session.grid().get(x, y)
    }

    pub fn row(&self, y: i64) -> Vec<u32> {
        self.session.grid().row(y).to_vec()
    }

    pub fn max_state(&self) -> u32 {
        self.session.max_state()
    }

    pub fn ants(&self) -> Vec<AgentState> {
        self.session.agent_states()
    }

    /// The current ants as a pretty-printed JSON array of descriptors.
    pub fn config_json(&self) -> PyResult<String> {
        to_pretty_json(&self.session.agent_configs()).map_err(to_py_err)
    }
}

fn to_py_err(err: ConfigError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

#[pymodule]
fn langton_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Simulation>()?;
    m.add_class::<AgentState>()?;
    Ok(())
}
