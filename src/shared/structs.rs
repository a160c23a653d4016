/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::building::Person;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "enRoute")]
    EnRoute,
    #[serde(rename = "serving")]
    Serving,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    /// Direction of travel needed to get from `from` to `to`.
    pub fn between(from: u32, to: u32) -> Direction {
        if to > from {
            Direction::Up
        } else if to < from {
            Direction::Down
        } else {
            Direction::Idle
        }
    }

    pub fn opposite(&self) -> Direction {
        match *self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }

    /// True if `floor` lies strictly ahead of `from` in this direction.
    pub fn is_ahead(&self, from: u32, floor: u32) -> bool {
        match *self {
            Direction::Up => floor > from,
            Direction::Down => floor < from,
            Direction::Idle => false,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Idle => write!(f, "idle"),
        }
    }
}

/// Read-only snapshot of the car, published for rendering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarState {
    pub behaviour: Behaviour,
    pub floor: u32,
    pub direction: Direction,
    pub capacity: usize,
    pub passengers: Vec<Person>,
}
