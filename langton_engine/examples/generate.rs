use langton_engine::{SimulationConfig, TerminalRenderer, Workbench};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let config = SimulationConfig {
        grid_size: 200,
        steps_per_tick: 500,
        seed: Some(42),
        ..SimulationConfig::default()
    };
    let mut workbench = match Workbench::new(config) {
        Ok(workbench) => workbench,
        Err(e) => panic!("Error creating workbench: {}", e),
    };

    // Three ants, each with its own random 4 state rule set
    if let Err(e) = workbench.generate_unique_rulesets(3, 4) {
        panic!("Error generating configuration: {}", e);
    }
    if let Err(e) = workbench.apply_config_text() {
        panic!("Error applying configuration: {}", e);
    }
    println!("{}", workbench.config_text());

    let mut renderer = TerminalRenderer::stdout(70, 30);
    workbench.session_mut().start();
    for _ in 0..20 {
        workbench.frame(&mut renderer);
    }
    workbench.session_mut().stop();

    info!(
        ticks = workbench.session().tick_count(),
        max_state = workbench.session().max_state(),
        "finished"
    );
}
