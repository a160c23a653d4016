use serde::Deserialize;
use serde::Serialize;
use std::fmt;

use crate::shared::Direction;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub u64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person_{}", self.0)
    }
}

/// Why a serialized person was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersonError {
    #[error("origin and target are both floor {0}")]
    SameFloor(u32),

    #[error("direction {given} does not lead from floor {origin} to floor {target}")]
    DirectionMismatch {
        given: Direction,
        origin: u32,
        target: u32,
    },
}

/**
 * A passenger with a fixed itinerary.
 *
 * The travel direction is derived from the two floors when the person is
 * created and cannot be set afterwards. Only boarding and delivery change
 * `current_floor` and `in_elevator`.
 *
 * # Fields
 * - `id`:              Unique identity, used for removal and duplicate checks.
 * - `origin_floor`:    Floor the person arrived on.
 * - `current_floor`:   Floor the person is on, updated when delivered.
 * - `target_floor`:    Destination, never equal to the origin.
 * - `direction`:       Up or Down, never Idle.
 * - `in_elevator`:     True exactly while the person is a passenger.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "PersonRecord")]
pub struct Person {
    id: PersonId,
    origin_floor: u32,
    current_floor: u32,
    target_floor: u32,
    direction: Direction,
    #[serde(rename = "inElevator")]
    in_elevator: bool,
}

impl Person {
    /// Returns `None` when the origin and target are the same floor.
    pub fn new(id: PersonId, origin_floor: u32, target_floor: u32) -> Option<Person> {
        match Direction::between(origin_floor, target_floor) {
            Direction::Idle => None,
            direction => Some(Person {
                id,
                origin_floor,
                current_floor: origin_floor,
                target_floor,
                direction,
                in_elevator: false,
            }),
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn origin_floor(&self) -> u32 {
        self.origin_floor
    }

    pub fn current_floor(&self) -> u32 {
        self.current_floor
    }

    pub fn target_floor(&self) -> u32 {
        self.target_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn in_elevator(&self) -> bool {
        self.in_elevator
    }

    pub fn is_delivered(&self) -> bool {
        !self.in_elevator && self.current_floor == self.target_floor
    }

    pub(crate) fn enter_car(&mut self) {
        self.in_elevator = true;
    }

    pub(crate) fn leave_car(&mut self, floor: u32) {
        self.in_elevator = false;
        self.current_floor = floor;
    }
}

/// Wire form of a `Person`, checked before it becomes one.
#[derive(Deserialize)]
struct PersonRecord {
    id: PersonId,
    origin_floor: u32,
    current_floor: u32,
    target_floor: u32,
    direction: Direction,
    #[serde(rename = "inElevator")]
    in_elevator: bool,
}

impl TryFrom<PersonRecord> for Person {
    type Error = PersonError;

    fn try_from(record: PersonRecord) -> Result<Person, PersonError> {
        let mut person = Person::new(record.id, record.origin_floor, record.target_floor)
            .ok_or(PersonError::SameFloor(record.origin_floor))?;

        if person.direction != record.direction {
            return Err(PersonError::DirectionMismatch {
                given: record.direction,
                origin: record.origin_floor,
                target: record.target_floor,
            });
        }

        person.current_floor = record.current_floor;
        person.in_elevator = record.in_elevator;
        Ok(person)
    }
}
