use log::debug;
use rand::Rng;

use crate::building::person::{Person, PersonId};
use crate::shared::Direction;

#[derive(Debug, Clone)]
struct QueueEntry {
    person: Person,
    position: usize,
}

/**
 * Per-floor waiting lists.
 *
 * Floors are numbered `1..=floor_count`. Every floor keeps its waiting people
 * in arrival order together with a queue position. Positions on a floor are
 * always `0..len` in that order: a removal shifts every later entry down by
 * one, so a person who was third in line stays behind the two who arrived
 * before them no matter who boards out of order.
 *
 * Out-of-range floors never panic, they read as empty and refuse writes.
 */
#[derive(Debug, Clone)]
pub struct FloorQueueStore {
    floors: Vec<Vec<QueueEntry>>,
    next_id: u64,
}

impl FloorQueueStore {
    pub fn new(floor_count: u32) -> FloorQueueStore {
        FloorQueueStore {
            floors: (0..floor_count).map(|_| Vec::new()).collect(),
            next_id: 0,
        }
    }

    pub fn floor_count(&self) -> u32 {
        self.floors.len() as u32
    }

    /// Creates a person on `floor` with a uniformly random target and puts
    /// them at the back of that floor's line.
    pub fn spawn<R: Rng + ?Sized>(&mut self, floor: u32, rng: &mut R) -> Option<Person> {
        let n_floors = self.floor_count();
        if !self.is_valid_floor(floor) || n_floors < 2 {
            return None;
        }

        // Draw from the other n-1 floors, skipping over our own
        let mut target_floor = rng.gen_range(1..n_floors);
        if target_floor >= floor {
            target_floor += 1;
        }

        let id = self.fresh_id()?;
        let person = Person::new(id, floor, target_floor)?;
        self.push(person.clone());
        debug!(
            "{} spawned on floor {} going {} to floor {}",
            person.id(),
            floor,
            person.direction(),
            target_floor
        );
        Some(person)
    }

    /// Appends an already built person. Refused for an invalid floor, a
    /// person already in the car or already delivered, or an id that is
    /// already queued.
    pub fn enqueue(&mut self, person: Person) -> bool {
        if !self.is_valid_floor(person.current_floor()) || person.in_elevator() {
            return false;
        }
        if person.current_floor() == person.target_floor() {
            debug!("{} is already on floor {}, not queued", person.id(), person.target_floor());
            return false;
        }
        if self.queue_position(person.id()).is_some() {
            return false;
        }
        // Keep fresh ids clear of anything handed in from outside
        self.next_id = self.next_id.max(person.id().0.saturating_add(1));
        self.push(person);
        true
    }

    pub fn waiting_by_direction(&self, floor: u32, direction: Direction) -> Vec<Person> {
        self.entries(floor)
            .iter()
            .filter(|entry| entry.person.direction() == direction)
            .map(|entry| entry.person.clone())
            .collect()
    }

    pub fn all_waiting(&self, floor: u32) -> Vec<Person> {
        self.entries(floor)
            .iter()
            .map(|entry| entry.person.clone())
            .collect()
    }

    /// Removes `person` from the floor they are waiting on and closes the gap
    /// in the queue positions behind them.
    pub fn remove(&mut self, person: &Person) -> Option<Person> {
        let floor = person.current_floor();
        if !self.is_valid_floor(floor) {
            return None;
        }

        let queue = &mut self.floors[(floor - 1) as usize];
        let index = queue
            .iter()
            .position(|entry| entry.person.id() == person.id())?;
        let removed = queue.remove(index);

        for entry in queue.iter_mut() {
            if entry.position > removed.position {
                entry.position -= 1;
            }
        }

        Some(removed.person)
    }

    pub fn has_any_waiting(&self) -> bool {
        self.floors.iter().any(|queue| !queue.is_empty())
    }

    pub fn has_waiting(&self, floor: u32) -> bool {
        !self.entries(floor).is_empty()
    }

    pub fn queue_len(&self, floor: u32) -> usize {
        self.entries(floor).len()
    }

    pub fn total_waiting(&self) -> usize {
        self.floors.iter().map(|queue| queue.len()).sum()
    }

    pub fn queue_position(&self, id: PersonId) -> Option<usize> {
        self.floors
            .iter()
            .flatten()
            .find(|entry| entry.person.id() == id)
            .map(|entry| entry.position)
    }

    /// Queue positions of `floor` in line order.
    pub fn queue_positions(&self, floor: u32) -> Vec<usize> {
        self.entries(floor).iter().map(|entry| entry.position).collect()
    }

    fn push(&mut self, person: Person) {
        let queue = &mut self.floors[(person.current_floor() - 1) as usize];
        let position = queue
            .iter()
            .map(|entry| entry.position + 1)
            .max()
            .unwrap_or(0);
        queue.push(QueueEntry { person, position });
    }

    /// `None` once the id space is used up.
    fn fresh_id(&mut self) -> Option<PersonId> {
        let id = PersonId(self.next_id);
        self.next_id = self.next_id.checked_add(1)?;
        Some(id)
    }

    fn entries(&self, floor: u32) -> &[QueueEntry] {
        if self.is_valid_floor(floor) {
            &self.floors[(floor - 1) as usize]
        } else {
            &[]
        }
    }

    fn is_valid_floor(&self, floor: u32) -> bool {
        floor >= 1 && floor <= self.floor_count()
    }
}
