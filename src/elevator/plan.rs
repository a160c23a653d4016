/*
 * Dispatch decisions.
 *
 * Everything in here runs while the dispatcher holds the building lock and
 * never waits. The dispatcher thread owns the timing around these calls.
 */
use log::{debug, warn};

use crate::building::{Building, FloorQueueStore, Person};
use crate::elevator::ElevatorCar;
use crate::shared::Direction;

/// Picks the floor the car should head for next and commits the car's
/// direction toward it. `None` means there is nothing to do right now.
pub fn choose_target(building: &mut Building) -> Option<u32> {
    let car_floor = building.car.current_floor();

    // Passengers come first
    if let Some(floor) = building.car.next_service_floor() {
        commit_direction(&mut building.car, floor);
        return Some(floor);
    }

    if !building.queues.has_any_waiting() {
        return None;
    }

    match building.car.direction() {
        Direction::Idle => {
            let floor = nearest_waiting_floor(&building.queues, car_floor)?;
            commit_direction(&mut building.car, floor);
            Some(floor)
        }
        direction => {
            if let Some(floor) = first_waiting_ahead(&building.queues, car_floor, direction) {
                return Some(floor);
            }

            let reversed = direction.opposite();
            building.car.set_direction(reversed);
            if let Some(floor) = first_waiting_ahead(&building.queues, car_floor, reversed) {
                debug!("Sweep {} exhausted, reversing", direction);
                return Some(floor);
            }

            // Only our own floor has people: drop the commitment so anyone can get on
            if building.queues.has_waiting(car_floor) {
                building.car.set_direction(Direction::Idle);
                return Some(car_floor);
            }
            None
        }
    }
}

/// Floors to stop at on the way from the car's floor to `target`, in
/// travel order and ending with `target`. A full car only stops to let
/// people off.
pub fn travel_plan(building: &Building, target: u32) -> Vec<u32> {
    let car = &building.car;
    let current = car.current_floor();
    if current == target {
        return vec![current];
    }

    let between: Vec<u32> = if target > current {
        (current + 1..target).collect()
    } else {
        (target + 1..current).rev().collect()
    };

    let mut stops: Vec<u32> = between
        .into_iter()
        .filter(|floor| {
            car.has_drop_off(*floor) || (!car.is_full() && building.queues.has_waiting(*floor))
        })
        .collect();
    stops.push(target);
    stops
}

/// At the end of a sweep, with the car empty and no one left ahead, turn
/// around so people on this floor headed the other way can get on.
pub fn reverse_at_sweep_end(building: &mut Building) -> bool {
    let car_floor = building.car.current_floor();
    let direction = building.car.direction();

    if direction == Direction::Idle || !building.car.passengers().is_empty() {
        return false;
    }
    if first_waiting_ahead(&building.queues, car_floor, direction).is_some() {
        return false;
    }
    if !building.queues.waiting_by_direction(car_floor, direction).is_empty() {
        return false;
    }
    if building
        .queues
        .waiting_by_direction(car_floor, direction.opposite())
        .is_empty()
    {
        return false;
    }

    building.car.set_direction(direction.opposite());
    true
}

/// Boards eligible people on the car's floor in queue order until the car
/// is full. Returns the people who got on.
pub fn board_waiting(building: &mut Building) -> Vec<Person> {
    let floor = building.car.current_floor();
    let candidates = match building.car.direction() {
        Direction::Idle => building.queues.all_waiting(floor),
        direction => building.queues.waiting_by_direction(floor, direction),
    };

    let mut boarded = Vec::new();
    for candidate in candidates {
        if building.car.is_full() {
            break;
        }
        if !building.car.can_board(&candidate) {
            continue;
        }

        // Someone else may have taken them out of line already
        let person = match building.queues.remove(&candidate) {
            Some(person) => person,
            None => continue,
        };

        if building.car.board(&person) {
            let mut rider = person;
            rider.enter_car();
            boarded.push(rider);
        } else {
            warn!("{} refused after leaving the line, queueing again", person.id());
            building.queues.enqueue(person);
        }
    }
    boarded
}

/// Closest floor with anyone waiting. Equal distances go to the lower floor.
pub fn nearest_waiting_floor(queues: &FloorQueueStore, from: u32) -> Option<u32> {
    (1..=queues.floor_count())
        .filter(|floor| queues.has_waiting(*floor))
        .min_by_key(|floor| (floor.abs_diff(from), *floor))
}

/// First floor strictly ahead of `from` in `direction` with anyone waiting.
pub fn first_waiting_ahead(queues: &FloorQueueStore, from: u32, direction: Direction) -> Option<u32> {
    match direction {
        Direction::Up => (from + 1..=queues.floor_count()).find(|floor| queues.has_waiting(*floor)),
        Direction::Down => (1..from).rev().find(|floor| queues.has_waiting(*floor)),
        Direction::Idle => None,
    }
}

fn commit_direction(car: &mut ElevatorCar, floor: u32) {
    match Direction::between(car.current_floor(), floor) {
        Direction::Idle => {}
        direction => car.set_direction(direction),
    }
}
