use anyhow::{ensure, Result};
use clap::Parser;
use log::info;
use traffic_grid::simulation::{
    Direction, GameEngine, GridPosition, LightCommand, SimConfig, TrafficLightState,
    DEFAULT_SPAWN_INTERVAL, DEFAULT_VEHICLE_SPEED,
};

#[derive(Parser)]
#[command(name = "traffic_grid")]
#[command(about = "Headless grid traffic simulation")]
struct Cli {
    /// Grid width in intersections (10-20)
    #[arg(long, default_value = "15")]
    width: i32,

    /// Grid height in intersections (10-20)
    #[arg(long, default_value = "15")]
    height: i32,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "1800")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.033")]
    delta: f64,

    /// Seconds between vehicle spawns
    #[arg(long, default_value_t = DEFAULT_SPAWN_INTERVAL)]
    spawn_interval: f64,

    /// Vehicle speed in grid units per second
    #[arg(long, default_value_t = DEFAULT_VEHICLE_SPEED)]
    speed: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Run a fixed-cycle operator that flips every light each N ticks
    #[arg(long)]
    toggle_every: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    ensure!(cli.delta > 0.0, "Tick delta must be positive, got {}", cli.delta);
    let config = SimConfig {
        width: cli.width,
        height: cli.height,
        spawn_interval: cli.spawn_interval,
        vehicle_speed: cli.speed,
        seed: cli.seed,
    };

    let mut engine = GameEngine::new(&config)?;
    info!(
        "Running {}x{} grid for {} ticks of {}s",
        config.width, config.height, cli.ticks, cli.delta
    );

    if cli.toggle_every.is_some() {
        // Start with north-south traffic held so the phases alternate
        for_each_light(&engine, |intersection, direction| {
            let state = match direction {
                Direction::North | Direction::South => TrafficLightState::Red,
                Direction::East | Direction::West => TrafficLightState::Green,
            };
            LightCommand::SetLight {
                intersection,
                direction,
                state,
            }
        })
        .into_iter()
        .for_each(|command| engine.queue_command(command));
    }

    let ticks_per_second = ((1.0 / cli.delta).ceil() as u32).max(1);
    for tick in 1..=cli.ticks {
        if let Some(period) = cli.toggle_every.filter(|period| *period > 0) {
            if tick % period == 0 {
                for_each_light(&engine, |intersection, direction| LightCommand::ToggleLight {
                    intersection,
                    direction,
                })
                .into_iter()
                .for_each(|command| engine.queue_command(command));
            }
        }

        engine.tick(cli.delta);

        if tick % ticks_per_second == 0 {
            info!("{}", engine.state().summary());
        }
    }

    engine.log_summary();
    Ok(())
}

/// One command per light in the city
fn for_each_light<F>(engine: &GameEngine, mut make: F) -> Vec<LightCommand>
where
    F: FnMut(GridPosition, Direction) -> LightCommand,
{
    engine
        .state()
        .city
        .intersections()
        .iter()
        .flat_map(|intersection| {
            Direction::ALL
                .into_iter()
                .map(move |direction| (intersection.position, direction))
        })
        .map(|(intersection, direction)| make(intersection, direction))
        .collect()
}
