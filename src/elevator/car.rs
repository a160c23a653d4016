use log::debug;

use crate::building::Person;
use crate::shared::Direction;

/// Reasons a person is turned away at the car door. None of them are fatal,
/// the person simply stays in line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardingError {
    #[error("car is full")]
    CapacityExceeded,

    #[error("person is on floor {person_floor}, car is on floor {car_floor}")]
    WrongFloor { person_floor: u32, car_floor: u32 },

    #[error("person goes {person}, car goes {car}")]
    DirectionMismatch { person: Direction, car: Direction },

    #[error("person is already a passenger")]
    DuplicateBoarding,
}

/**
 * The elevator car.
 *
 * Holds at most `capacity` passengers. An idle car (no committed direction)
 * takes anyone standing on its floor, a car with a direction only takes
 * people headed the same way.
 */
#[derive(Debug, Clone)]
pub struct ElevatorCar {
    capacity: usize,
    current_floor: u32,
    direction: Direction,
    passengers: Vec<Person>,
}

impl ElevatorCar {
    pub fn new(capacity: usize, start_floor: u32) -> ElevatorCar {
        ElevatorCar {
            capacity,
            current_floor: start_floor,
            direction: Direction::Idle,
            passengers: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_floor(&self) -> u32 {
        self.current_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn passengers(&self) -> &[Person] {
        &self.passengers
    }

    pub fn is_full(&self) -> bool {
        self.passengers.len() >= self.capacity
    }

    pub fn has_drop_off(&self, floor: u32) -> bool {
        self.passengers.iter().any(|p| p.target_floor() == floor)
    }

    pub fn check_boarding(&self, person: &Person) -> Result<(), BoardingError> {
        if self.is_full() {
            return Err(BoardingError::CapacityExceeded);
        }
        if self.passengers.iter().any(|p| p.id() == person.id()) {
            return Err(BoardingError::DuplicateBoarding);
        }
        if person.current_floor() != self.current_floor {
            return Err(BoardingError::WrongFloor {
                person_floor: person.current_floor(),
                car_floor: self.current_floor,
            });
        }
        if self.direction != Direction::Idle && person.direction() != self.direction {
            return Err(BoardingError::DirectionMismatch {
                person: person.direction(),
                car: self.direction,
            });
        }
        Ok(())
    }

    pub fn can_board(&self, person: &Person) -> bool {
        self.check_boarding(person).is_ok()
    }

    /// Takes a copy of `person` on board. `false` leaves them waiting.
    pub fn board(&mut self, person: &Person) -> bool {
        match self.check_boarding(person) {
            Ok(()) => {
                let mut passenger = person.clone();
                passenger.enter_car();
                self.passengers.push(passenger);
                true
            }
            Err(e) => {
                debug!("{} not boarded: {}", person.id(), e);
                false
            }
        }
    }

    pub fn alight_at_current_floor(&mut self) -> Vec<Person> {
        let floor = self.current_floor;
        let (mut leaving, staying): (Vec<Person>, Vec<Person>) = self
            .passengers
            .drain(..)
            .partition(|p| p.target_floor() == floor);
        self.passengers = staying;

        for person in leaving.iter_mut() {
            person.leave_car(floor);
        }
        leaving
    }

    /// Nearest passenger destination in the sweep direction. When nothing is
    /// left ahead the direction flips once and the other side is searched.
    pub fn next_service_floor(&mut self) -> Option<u32> {
        if self.passengers.is_empty() {
            return None;
        }

        if self.direction == Direction::Idle {
            let floor = self.current_floor;
            return self
                .passengers
                .iter()
                .map(|p| p.target_floor())
                .min_by_key(|target| (target.abs_diff(floor), *target));
        }

        if let Some(floor) = self.nearest_target(self.direction) {
            return Some(floor);
        }
        self.direction = self.direction.opposite();
        self.nearest_target(self.direction)
    }

    pub fn set_floor(&mut self, floor: u32) {
        self.current_floor = floor;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn nearest_target(&self, direction: Direction) -> Option<u32> {
        let ahead = self
            .passengers
            .iter()
            .map(|p| p.target_floor())
            .filter(|target| direction.is_ahead(self.current_floor, *target));

        match direction {
            Direction::Up => ahead.min(),
            Direction::Down => ahead.max(),
            Direction::Idle => None,
        }
    }
}
