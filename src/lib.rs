/* Modules */
pub mod arrivals;
pub mod building;
pub mod config;
pub mod elevator;
pub mod shared;
pub mod simulation;

/* Re-exports */
pub use arrivals::ArrivalGenerator;
pub use building::{Building, FloorQueueStore, Person, PersonId};
pub use config::{Config, ConfigError};
pub use elevator::{Animator, ElevatorCar, InstantAnimator, MoveHandle, TimedAnimator};
pub use shared::{Behaviour, CarState, Direction};
pub use simulation::Simulation;

mod simulation_tests;
