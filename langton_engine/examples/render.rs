use langton_engine::{
    PaletteKind, SimulationConfig, SimulationSession, StatePalette, TerminalRenderer,
};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let config = SimulationConfig {
        grid_size: 120,
        steps_per_tick: 20,
        ..SimulationConfig::default()
    };
    let mut session = SimulationSession::new(&config);
    let palette = StatePalette::new(PaletteKind::Default, None);
    let mut renderer = TerminalRenderer::stdout(60, 24);

    session.start();
    for _ in 0..300 {
        session.frame(&mut renderer, &palette);
        thread::sleep(Duration::from_millis(30));
    }
    session.stop();

    println!("\nStopped after {} ticks", session.tick_count());
}
