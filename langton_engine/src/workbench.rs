use crate::config::{
    self, parse_agent_configs, parse_rule_specs, to_pretty_json, AgentConfig, SimulationConfig,
};
use crate::editor::RuleGraphEditor;
use crate::error::{ConfigError, EditorError};
use crate::palette::{Palette, StatePalette};
use crate::render::Renderer;
use crate::rules::{default_rules, parse_rules, Rule, RuleSpec};
use crate::simulation::SimulationSession;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

/// Ties the configuration text, the running simulation, the rule editor and the palette together.
///
/// The configuration text is the source of truth for the ants: the editor edits the rules of
/// one ant at a time and writes them back into the text, and applying the text rebuilds the
/// simulation.
pub struct Workbench {
    config: SimulationConfig,
    config_text: String,
    session: SimulationSession,
    editor: RuleGraphEditor,
    palette: Box<dyn Palette>,
    editor_agent: usize,
    rng: StdRng,
}

impl Workbench {
    /// Creates a workbench with a [`StatePalette`] built from the configuration.
    pub fn new(config: SimulationConfig) -> Result<Workbench, ConfigError> {
        let palette = StatePalette::new(config.palette, config.seed);
        Workbench::with_palette(config, Box::new(palette))
    }

    pub fn with_palette(
        config: SimulationConfig,
        palette: Box<dyn Palette>,
    ) -> Result<Workbench, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = SimulationSession::new(&config);
        let config_text = to_pretty_json(&session.agent_configs())?;

        let mut workbench = Workbench {
            config,
            config_text,
            session,
            editor: RuleGraphEditor::new(),
            palette,
            editor_agent: 0,
            rng,
        };
        workbench.load_editor_rules(&default_rules());

        Ok(workbench)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn session(&self) -> &SimulationSession {
        &self.session
    }

    /// Direct access to the session, e.g. to start, stop or single-step it.
    pub fn session_mut(&mut self) -> &mut SimulationSession {
        &mut self.session
    }

    pub fn editor(&self) -> &RuleGraphEditor {
        &self.editor
    }

    /// Direct access to the editor, to forward pointer events and edge edits.
    pub fn editor_mut(&mut self) -> &mut RuleGraphEditor {
        &mut self.editor
    }

    pub fn palette(&self) -> &dyn Palette {
        self.palette.as_ref()
    }

    pub fn config_text(&self) -> &str {
        &self.config_text
    }

    pub fn set_config_text<S: Into<String>>(&mut self, text: S) {
        self.config_text = text.into();
    }

    /// Index of the ant whose rules are shown in the editor.
    pub fn editor_agent(&self) -> usize {
        self.editor_agent
    }

    /// Ids of the ants in the simulation, in order.
    pub fn agent_ids(&self) -> Vec<String> {
        self.session
            .ants()
            .iter()
            .map(|ant| ant.id().to_string())
            .collect()
    }

    /// Rebuilds the simulation from the configuration text.
    ///
    /// On any error the simulation, the editor and the text are left as they were.
    /// On success the simulation is stopped on a blank grid and the editor shows the rules of
    /// the selected ant, or of the first one if the selection is out of range.
    pub fn apply_config_text(&mut self) -> Result<(), ConfigError> {
        let configs = parse_agent_configs(&self.config_text).map_err(|err| {
            error!(error = %err, "could not parse the ant configuration");
            err
        })?;
        if configs.is_empty() {
            warn!("ant configuration is empty, using the default ant");
        }

        self.session.initialize(&configs).map_err(|err| {
            error!(error = %err, "refusing to apply an invalid ant configuration");
            err
        })?;
        self.session.stop();
        self.palette
            .ensure_color_count((self.session.max_state() as usize).saturating_add(1));

        if self.editor_agent >= self.session.ants().len() {
            self.editor_agent = 0;
        }
        let rules = self
            .session
            .ants()
            .get(self.editor_agent)
            .map(|ant| ant.rules().rules().to_vec())
            .unwrap_or_else(default_rules);
        self.load_editor_rules(&rules);
        info!(ants = self.session.ants().len(), "applied ant configuration");

        Ok(())
    }

    /// Stops the simulation and goes back to the default ant, in the text and in the editor.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.session.reset();
        self.config_text = to_pretty_json(&self.session.agent_configs())?;
        self.editor_agent = 0;
        self.load_editor_rules(&default_rules());
        info!("workbench reset to the default configuration");

        Ok(())
    }

    /// Shows the rules of ant `index`, as written in the configuration text, in the editor.
    ///
    /// Falls back to the default rules when the text cannot be read or has no rules for that ant.
    pub fn select_editor_agent(&mut self, index: usize) {
        self.editor_agent = index;

        let specs = match parse_agent_configs(&self.config_text) {
            Ok(configs) => configs.into_iter().nth(index).and_then(|config| config.rules),
            Err(err) => {
                warn!(error = %err, "could not read the ant configuration, showing default rules");
                None
            }
        };

        let rules = match specs.map(|specs| parse_rules(&specs)) {
            Some(Ok(rules)) => rules,
            Some(Err(err)) => {
                warn!(index, error = %err, "ant has invalid rules, showing default rules");
                default_rules()
            }
            None => {
                warn!(index, "no rules for this ant, showing default rules");
                default_rules()
            }
        };
        self.load_editor_rules(&rules);
    }

    /// Writes the editor rules into the descriptor of the selected ant in the configuration text.
    ///
    /// Missing descriptors before it are added with an empty rule set. A text that is valid JSON
    /// but not an array is replaced by a new array.
    pub fn editor_to_config_text(&mut self) -> Result<(), ConfigError> {
        let mut configs = match parse_agent_configs(&self.config_text) {
            Ok(configs) => configs,
            Err(ConfigError::NotAnArray { found }) => {
                warn!(found, "configuration text is not an array, starting a new one");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        while configs.len() <= self.editor_agent {
            configs.push(AgentConfig {
                id: Some(format!("ant_{}", configs.len())),
                rules: Some(Vec::new()),
                ..AgentConfig::default()
            });
        }
        configs[self.editor_agent].rules = Some(self.editor_rule_specs());

        self.config_text = to_pretty_json(&configs)?;
        info!(agent = self.editor_agent, "wrote editor rules to the configuration");

        Ok(())
    }

    /// Writes the editor rules into the configuration text, then applies it.
    pub fn apply_editor_to_simulation(&mut self) -> Result<(), ConfigError> {
        self.editor_to_config_text()?;
        self.apply_config_text()
    }

    /// The editor rules as a pretty-printed JSON array.
    pub fn editor_rules_json(&self) -> Result<String, ConfigError> {
        to_pretty_json(&self.editor_rule_specs())
    }

    /// Loads a JSON rule array into the editor and returns the rules as the editor now has them.
    pub fn apply_json_to_editor(&mut self, text: &str) -> Result<String, ConfigError> {
        let specs = parse_rule_specs(text)?;
        let rules = parse_rules(&specs).map_err(|source| ConfigError::InvalidRules {
            agent: self.editor_agent,
            source,
        })?;

        self.load_editor_rules(&rules);
        self.editor_rules_json()
    }

    /// Replaces the configuration text with `num_ants` random ants sharing one rule set.
    pub fn generate_shared_ruleset(
        &mut self,
        num_ants: usize,
        num_states: usize,
    ) -> Result<(), ConfigError> {
        let configs = config::generate_shared_ruleset(
            num_ants,
            num_states,
            self.session.grid().size(),
            &mut self.rng,
        );
        self.load_generated(configs)
    }

    /// Replaces the configuration text with `num_ants` random ants, each with its own rule set.
    pub fn generate_unique_rulesets(
        &mut self,
        num_ants: usize,
        num_states: usize,
    ) -> Result<(), ConfigError> {
        let configs = config::generate_unique_rulesets(
            num_ants,
            num_states,
            self.session.grid().size(),
            &mut self.rng,
        );
        self.load_generated(configs)
    }

    /// Adds a state node to the editor on its canvas.
    pub fn add_state(&mut self) -> Result<u32, EditorError> {
        let id = self.editor.add_node(self.config.viewport)?;
        self.palette
            .ensure_color_count(self.editor.required_color_count());

        Ok(id)
    }

    /// Removes the selected state node from the editor.
    pub fn remove_state(&mut self) -> Result<u32, EditorError> {
        self.editor.remove_selected_node()
    }

    /// Sizes the editor canvas from the renderer's surface and lays the current rules out again.
    pub fn fit_editor_to(&mut self, renderer: &dyn Renderer) {
        let viewport = renderer.viewport_size();
        if viewport == self.config.viewport {
            return;
        }

        self.config.viewport = viewport;
        let rules = self.editor.rules();
        self.load_editor_rules(&rules);
        debug!(width = viewport.width, height = viewport.height, "editor canvas resized");
    }

    /// Advances and draws the simulation if it is running.
    pub fn frame(&mut self, renderer: &mut dyn Renderer) -> bool {
        self.session.frame(renderer, self.palette.as_ref())
    }

    fn load_generated(&mut self, configs: Vec<AgentConfig>) -> Result<(), ConfigError> {
        self.config_text = to_pretty_json(&configs)?;
        self.select_editor_agent(0);
        info!(ants = configs.len(), "generated a random configuration");

        Ok(())
    }

    fn load_editor_rules(&mut self, rules: &[Rule]) {
        let count = self.editor.load_rules(rules, self.config.viewport);
        self.palette.ensure_color_count(count);
    }

    fn editor_rule_specs(&self) -> Vec<RuleSpec> {
        self.editor
            .rules()
            .into_iter()
            .map(RuleSpec::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Viewport};
    use crate::palette::{FALLBACK_COLOR, MAX_PALETTE_COLORS};
    use crate::rules::Turn;
    use std::sync::{Arc, Mutex};

    /// Palette that records the largest color count it was asked for.
    struct RecordingPalette {
        requested: Arc<Mutex<usize>>,
    }

    impl Palette for RecordingPalette {
        fn color_for_state(&self, _state: u32) -> String {
            "#000000".to_string()
        }

        fn ensure_color_count(&mut self, count: usize) {
            let mut requested = self.requested.lock().unwrap();
            *requested = (*requested).max(count);
        }
    }

    struct FixedRenderer {
        viewport: Viewport,
    }

    impl Renderer for FixedRenderer {
        fn draw_frame(&mut self, _session: &SimulationSession, _palette: &dyn Palette) {}

        fn viewport_size(&self) -> Viewport {
            self.viewport
        }
    }

    fn config() -> SimulationConfig {
        SimulationConfig {
            grid_size: 50,
            seed: Some(3),
            ..SimulationConfig::default()
        }
    }

    fn workbench() -> Workbench {
        Workbench::new(config()).unwrap()
    }

    #[test]
    fn when_creating_a_workbench_the_text_and_editor_show_the_default_ant() {
        let workbench = workbench();
        let configs = parse_agent_configs(workbench.config_text()).unwrap();

        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].id.as_deref(), Some("ant_0"));
        assert_eq!((configs[0].x, configs[0].y), (Some(25), Some(25)));
        assert_eq!(workbench.editor().rules(), default_rules());
    }

    #[test]
    fn when_applying_valid_text_the_simulation_is_rebuilt_and_stopped() {
        let mut workbench = workbench();
        workbench.session_mut().start();
        workbench.set_config_text(
            r#"[
                {"id": "a", "x": 1, "y": 2, "dir": 1},
                {"id": "b", "rules": [{"currentState": 0, "turn": 2, "nextCellState": 3}]}
            ]"#,
        );

        workbench.apply_config_text().unwrap();

        assert!(!workbench.session().is_running());
        assert_eq!(workbench.agent_ids(), vec!["a", "b"]);
        assert_eq!(workbench.session().ants()[0].position(), (1, 2));
        assert_eq!(workbench.editor().rules(), default_rules());
    }

    #[test]
    fn when_applying_malformed_text_everything_is_kept() {
        let mut workbench = workbench();
        workbench.session_mut().step();
        workbench.set_config_text("[{\"id\": ");

        let result = workbench.apply_config_text();

        assert!(matches!(result, Err(ConfigError::Malformed(_))));
        assert_eq!(workbench.session().tick_count(), 1);
        assert_eq!(workbench.config_text(), "[{\"id\": ");
    }

    #[test]
    fn when_applying_text_that_is_not_an_array_an_error_is_returned() {
        let mut workbench = workbench();
        workbench.set_config_text(r#"{"id": "a"}"#);

        assert!(matches!(
            workbench.apply_config_text(),
            Err(ConfigError::NotAnArray { found: "an object" })
        ));
    }

    #[test]
    fn when_applying_text_with_invalid_rules_the_simulation_is_kept() {
        let mut workbench = workbench();
        workbench.session_mut().step();
        workbench.set_config_text(
            r#"[{"rules": [{"currentState": 0, "turn": 7, "nextCellState": 1}]}]"#,
        );

        let result = workbench.apply_config_text();

        assert!(matches!(result, Err(ConfigError::InvalidRules { agent: 0, .. })));
        assert_eq!(workbench.session().tick_count(), 1);
    }

    #[test]
    fn when_applying_text_the_palette_is_sized_for_the_largest_state() {
        let requested = Arc::new(Mutex::new(0));
        let palette = RecordingPalette {
            requested: Arc::clone(&requested),
        };
        let mut workbench = Workbench::with_palette(config(), Box::new(palette)).unwrap();
        workbench.set_config_text(
            r#"[{"rules": [{"currentState": 0, "turn": 1, "nextCellState": 6}]}]"#,
        );

        workbench.apply_config_text().unwrap();

        assert_eq!(*requested.lock().unwrap(), 7);
    }

    #[test]
    fn when_applying_a_rule_with_the_largest_state_the_palette_stays_bounded() {
        let mut workbench = workbench();
        workbench.set_config_text(
            r#"[{"rules": [{"currentState": 0, "turn": 1, "nextCellState": 4294967295}]}]"#,
        );

        workbench.apply_config_text().unwrap();

        let palette = workbench.palette();
        assert_ne!(palette.color_for_state(MAX_PALETTE_COLORS as u32 - 1), FALLBACK_COLOR);
        assert_eq!(palette.color_for_state(MAX_PALETTE_COLORS as u32), FALLBACK_COLOR);
        assert_eq!(palette.color_for_state(u32::MAX), FALLBACK_COLOR);
        assert_eq!(workbench.editor().nodes().len(), 2);
    }

    #[test]
    fn when_the_selected_ant_no_longer_exists_the_editor_falls_back_to_the_first() {
        let mut workbench = workbench();
        workbench.set_config_text(r#"[{"id": "a"}, {"id": "b", "rules": []}]"#);
        workbench.apply_config_text().unwrap();
        workbench.select_editor_agent(1);
        assert!(workbench.editor().rules().is_empty());

        workbench.set_config_text(r#"[{"id": "a"}]"#);
        workbench.apply_config_text().unwrap();

        assert_eq!(workbench.editor_agent(), 0);
        assert_eq!(workbench.editor().rules(), default_rules());
    }

    #[test]
    fn when_selecting_an_ant_without_rules_the_default_rules_are_shown() {
        let mut workbench = workbench();
        workbench.set_config_text(r#"[{"id": "a", "rules": [{"currentState": 0, "turn": 0, "nextCellState": 0}]}]"#);

        workbench.select_editor_agent(0);
        assert_eq!(workbench.editor().rules(), vec![Rule::new(0, Turn::Straight, 0)]);

        workbench.select_editor_agent(4);
        assert_eq!(workbench.editor().rules(), default_rules());
    }

    #[test]
    fn when_writing_editor_rules_past_the_end_empty_descriptors_are_padded_in() {
        let mut workbench = workbench();
        workbench.select_editor_agent(2);
        workbench
            .apply_json_to_editor(r#"[{"currentState": 0, "turn": -1, "nextCellState": 0}]"#)
            .unwrap();

        workbench.editor_to_config_text().unwrap();

        let configs = parse_agent_configs(workbench.config_text()).unwrap();
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[1].id.as_deref(), Some("ant_1"));
        assert_eq!(configs[1].rules, Some(vec![]));
        assert_eq!(
            configs[2].rules,
            Some(vec![RuleSpec {
                current_state: 0,
                turn: -1,
                next_cell_state: 0
            }])
        );
    }

    #[test]
    fn when_writing_editor_rules_into_text_that_is_not_an_array_a_new_array_is_started() {
        let mut workbench = workbench();
        workbench.set_config_text("42");

        workbench.editor_to_config_text().unwrap();

        let configs = parse_agent_configs(workbench.config_text()).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].id.as_deref(), Some("ant_0"));
    }

    #[test]
    fn when_applying_the_editor_to_the_simulation_the_ant_uses_the_edited_rules() {
        let mut workbench = workbench();
        let edge = workbench.editor().edges()[0].id.clone();
        workbench
            .editor_mut()
            .update_edge_turn(&edge, Turn::Straight)
            .unwrap();

        workbench.apply_editor_to_simulation().unwrap();

        let ant = &workbench.session().ants()[0];
        assert_eq!(ant.rules().lookup(0).unwrap().turn, Turn::Straight);
        assert_eq!(workbench.editor().rules()[0].turn, Turn::Straight);
    }

    #[test]
    fn when_syncing_editor_rules_as_json_invalid_rules_are_refused() {
        let mut workbench = workbench();
        let before = workbench.editor_rules_json().unwrap();

        let result = workbench
            .apply_json_to_editor(r#"[{"currentState": -4, "turn": 0, "nextCellState": 0}]"#);

        assert!(matches!(result, Err(ConfigError::InvalidRules { .. })));
        assert_eq!(workbench.editor_rules_json().unwrap(), before);
        assert!(matches!(
            workbench.apply_json_to_editor("{}"),
            Err(ConfigError::NotAnArray { .. })
        ));
    }

    #[test]
    fn when_generating_unique_rulesets_the_text_and_editor_are_updated() {
        let mut workbench = workbench();
        workbench.generate_unique_rulesets(3, 4).unwrap();

        let configs = parse_agent_configs(workbench.config_text()).unwrap();
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[2].id.as_deref(), Some("gen_unique_ant_2"));
        assert_eq!(workbench.editor().rules().len(), 4);

        workbench.apply_config_text().unwrap();
        assert_eq!(workbench.session().ants().len(), 3);
    }

    #[test]
    fn when_generating_a_shared_ruleset_every_ant_has_the_same_rules() {
        let mut workbench = workbench();
        workbench.generate_shared_ruleset(4, 3).unwrap();

        let configs = parse_agent_configs(workbench.config_text()).unwrap();
        assert_eq!(configs.len(), 4);
        assert!(configs.iter().all(|config| config.rules == configs[0].rules));
    }

    #[test]
    fn when_resetting_the_default_ant_is_restored_everywhere() {
        let mut workbench = workbench();
        workbench.generate_unique_rulesets(2, 5).unwrap();
        workbench.apply_config_text().unwrap();
        workbench.session_mut().start();

        workbench.reset().unwrap();

        assert!(!workbench.session().is_running());
        assert_eq!(workbench.agent_ids(), vec!["ant_0"]);
        assert_eq!(workbench.editor().rules(), default_rules());
        assert_eq!(parse_agent_configs(workbench.config_text()).unwrap().len(), 1);
    }

    #[test]
    fn when_adding_and_removing_states_the_editor_is_updated() {
        let mut workbench = workbench();
        // The default rules are laid out as states 0 and 1
        assert_eq!(workbench.add_state(), Ok(2));

        let position = workbench.editor().node(2).unwrap().position;
        workbench.editor_mut().pointer_down(position, false);
        workbench.editor_mut().pointer_up(position);

        assert_eq!(workbench.remove_state(), Ok(2));
        assert!(workbench.editor().node(2).is_none());
        assert!(workbench.editor().node_at(Point::new(position.x, position.y)).is_none());
    }

    #[test]
    fn when_fitting_the_editor_to_a_renderer_the_nodes_are_laid_out_on_its_surface() {
        let mut workbench = workbench();
        workbench
            .apply_json_to_editor(r#"[{"currentState": 0, "turn": 0, "nextCellState": 0}]"#)
            .unwrap();
        let renderer = FixedRenderer {
            viewport: Viewport::new(200.0, 100.0),
        };

        workbench.fit_editor_to(&renderer);

        assert_eq!(workbench.config().viewport, Viewport::new(200.0, 100.0));
        assert_eq!(workbench.editor().nodes().len(), 1);
        assert_eq!(workbench.editor().node(0).unwrap().position, Point::new(100.0, 50.0));
        assert_eq!(workbench.editor().edges().len(), 1);
    }
}
