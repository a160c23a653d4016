use crossbeam_channel as cbc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};
use std::time::Duration;

use crate::building::Person;
use crate::config::ArrivalConfig;
use crate::simulation::Simulation;

/// What the generator needs from the simulation. Only clearly owned entry
/// points, never the waiting lists themselves.
pub trait ArrivalSink: Send + Sync + 'static {
    fn floor_count(&self) -> u32;
    fn queue_len(&self, floor: u32) -> usize;
    fn spawn_person(&self, floor: u32) -> Option<Person>;
}

impl ArrivalSink for Simulation {
    fn floor_count(&self) -> u32 {
        Simulation::floor_count(self)
    }

    fn queue_len(&self, floor: u32) -> usize {
        Simulation::queue_len(self, floor)
    }

    fn spawn_person(&self, floor: u32) -> Option<Person> {
        Simulation::spawn_person(self, floor)
    }
}

/**
 * Spawns people on every floor at random intervals.
 *
 * Each floor has its own timer thread and its own cancel channel. A floor
 * whose line already holds `max_queue_len` people skips its turn and tries
 * again after the next interval.
 *
 * # Fields
 * - `cancel_txs`:      One per floor timer. Dropping them ends the timers.
 * - `timer_threads`:   Joined by `stop()`.
 */
pub struct ArrivalGenerator {
    cancel_txs: Vec<cbc::Sender<()>>,
    timer_threads: Vec<JoinHandle<()>>,
}

impl ArrivalGenerator {
    pub fn start<S: ArrivalSink>(sink: Arc<S>, config: &ArrivalConfig) -> ArrivalGenerator {
        let mut cancel_txs = Vec::new();
        let mut timer_threads = Vec::new();

        for floor in 1..=sink.floor_count() {
            let (cancel_tx, cancel_rx) = cbc::bounded::<()>(1);
            let rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(floor))),
                None => StdRng::from_entropy(),
            };
            let timer = FloorTimer {
                floor,
                sink: sink.clone(),
                rng,
                min_interval: config.min_interval,
                max_interval: config.max_interval,
                max_queue_len: config.max_queue_len,
                cancel_rx,
            };

            let timer_thread = Builder::new().name(format!("arrivals_floor_{}", floor));
            match timer_thread.spawn(move || timer.run()) {
                Ok(handle) => {
                    cancel_txs.push(cancel_tx);
                    timer_threads.push(handle);
                }
                Err(e) => warn!("Failed to start arrivals for floor {}: {}", floor, e),
            }
        }

        info!("Arrivals started on {} floors", timer_threads.len());
        ArrivalGenerator {
            cancel_txs,
            timer_threads,
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        for cancel_tx in self.cancel_txs.drain(..) {
            let _ = cancel_tx.try_send(());
        }
        for handle in self.timer_threads.drain(..) {
            if handle.join().is_err() {
                warn!("Arrival timer thread panicked");
            }
        }
    }
}

impl Drop for ArrivalGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// A timer never fires back to back, even with a zero interval
const MIN_INTERVAL_MS: u64 = 1;

struct FloorTimer<S: ArrivalSink> {
    floor: u32,
    sink: Arc<S>,
    rng: StdRng,
    min_interval: u64,
    max_interval: u64,
    max_queue_len: usize,
    cancel_rx: cbc::Receiver<()>,
}

impl<S: ArrivalSink> FloorTimer<S> {
    fn run(mut self) {
        loop {
            let interval = Duration::from_millis(
                self.rng
                    .gen_range(self.min_interval..=self.max_interval)
                    .max(MIN_INTERVAL_MS),
            );

            cbc::select! {
                recv(self.cancel_rx) -> _ => break,
                default(interval) => self.arrive(),
            }
        }
        debug!("Arrivals on floor {} stopped", self.floor);
    }

    fn arrive(&mut self) {
        if self.sink.queue_len(self.floor) >= self.max_queue_len {
            debug!("Floor {} line is full, deferring arrival", self.floor);
            return;
        }

        if let Some(person) = self.sink.spawn_person(self.floor) {
            info!(
                "{} arrived on floor {} heading for floor {}",
                person.id(),
                self.floor,
                person.target_floor()
            );
        }
    }
}
