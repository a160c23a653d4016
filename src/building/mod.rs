pub mod floor_queues;
pub mod person;

pub use floor_queues::FloorQueueStore;
pub use person::{Person, PersonError, PersonId};

use crate::elevator::ElevatorCar;
use crate::shared::{Behaviour, CarState};

/// Everything the dispatcher mutates: the waiting lists, the car and what
/// the dispatcher is currently doing with it.
#[derive(Debug, Clone)]
pub struct Building {
    pub queues: FloorQueueStore,
    pub car: ElevatorCar,
    pub behaviour: Behaviour,
}

impl Building {
    pub fn new(n_floors: u32, capacity: usize, start_floor: u32) -> Building {
        Building {
            queues: FloorQueueStore::new(n_floors),
            car: ElevatorCar::new(capacity, start_floor),
            behaviour: Behaviour::Idle,
        }
    }

    pub fn floor_count(&self) -> u32 {
        self.queues.floor_count()
    }

    pub fn car_state(&self) -> CarState {
        CarState {
            behaviour: self.behaviour,
            floor: self.car.current_floor(),
            direction: self.car.direction(),
            capacity: self.car.capacity(),
            passengers: self.car.passengers().to_vec(),
        }
    }

    /// Nothing to do: nobody waiting and nobody riding.
    pub fn is_quiet(&self) -> bool {
        self.car.passengers().is_empty() && !self.queues.has_any_waiting()
    }
}
