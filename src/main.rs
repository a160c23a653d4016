/* 3rd party libraries */
use clap::Parser;
use crossbeam_channel as cbc;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/* Custom libraries */
use elevator_sim::config::{self, Config};
use elevator_sim::unwrap_or_exit;
use elevator_sim::{ArrivalGenerator, Simulation, TimedAnimator};

/// Single-car elevator simulation with random arrivals.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of floors
    #[clap(long)]
    floors: Option<u32>,

    /// Override the car capacity
    #[clap(long)]
    capacity: Option<usize>,

    /// Seed for reproducible arrivals and targets
    #[clap(long)]
    seed: Option<u64>,

    /// Stop after this many seconds, 0 runs until killed
    #[clap(long, default_value_t = 0)]
    run_for: u64,

    /// Print every car snapshot as a JSON line on stdout
    #[clap(long)]
    json: bool,
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load the configuration
    let mut config = if args.config.exists() {
        unwrap_or_exit!(config::load_config(&args.config))
    } else {
        warn!(
            "No configuration file at {}, using default settings",
            args.config.display()
        );
        Config::default()
    };
    if let Some(floors) = args.floors {
        config.elevator.n_floors = floors;
    }
    if let Some(capacity) = args.capacity {
        config.elevator.capacity = capacity;
    }
    if args.seed.is_some() {
        config.arrivals.seed = args.seed;
    }
    unwrap_or_exit!(config.validate());

    // Start the simulation
    let mut simulation = unwrap_or_exit!(Simulation::initialize(
        config.elevator.clone(),
        Box::new(TimedAnimator::new()),
    ));
    if let Some(seed) = config.arrivals.seed {
        simulation = simulation.with_seed(seed);
    }
    let simulation = Arc::new(simulation);

    let state_rx = simulation.subscribe_state();
    let delivered_rx = simulation.deliveries();
    simulation.run();

    // Start the arrivals
    let arrivals = ArrivalGenerator::start(simulation.clone(), &config.arrivals);

    let deadline = match args.run_for {
        0 => None,
        secs => Some(Instant::now() + Duration::from_secs(secs)),
    };
    let mut delivered = 0u64;

    loop {
        cbc::select! {
            recv(state_rx) -> state => {
                if let Ok(state) = state {
                    if args.json {
                        match serde_json::to_string(&state) {
                            Ok(line) => println!("{}", line),
                            Err(e) => warn!("Failed to serialize car state: {}", e),
                        }
                    }
                    info!(
                        "Car {:?} on floor {} going {} with {}/{} passengers, {} waiting",
                        state.behaviour,
                        state.floor,
                        state.direction,
                        state.passengers.len(),
                        state.capacity,
                        simulation.total_waiting()
                    );
                }
            }
            recv(delivered_rx) -> person => {
                if person.is_ok() {
                    delivered += 1;
                }
            }
            default(Duration::from_millis(100)) => {}
        }

        if deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            break;
        }
    }

    arrivals.stop();
    simulation.stop();
    info!(
        "Simulation finished: {} delivered, {} still waiting",
        delivered,
        simulation.total_waiting()
    );
}
