/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::building::{Building, Person};
use crate::config::{ConfigError, ElevatorConfig};
use crate::elevator::{Animator, Dispatcher};
use crate::shared::CarState;

const STATE_BUFFER: usize = 256;
const DELIVERY_BUFFER: usize = 1024;

/**
 * Entry point for the surrounding application.
 *
 * Owns the building, starts the dispatcher thread and exposes the arrival
 * entry points and read-only queries a renderer needs. `Simulation` is
 * `Sync`, share it behind an `Arc` with the arrival generator.
 *
 * # Fields
 * - `building`:        Waiting lists and car, shared with the dispatcher thread.
 * - `config`:          Building size and timings, fixed at initialization.
 * - `rng`:             Draws target floors for spawned people.
 * - `animator`:        Handed to the dispatcher on the first `run()`.
 * - `running`:         Guards against starting a second dispatcher.
 */
pub struct Simulation {
    building: Arc<Mutex<Building>>,
    config: ElevatorConfig,
    rng: Mutex<StdRng>,
    animator: Mutex<Option<Box<dyn Animator>>>,
    running: AtomicBool,
    dispatcher_thread: Mutex<Option<JoinHandle<()>>>,

    // Dispatcher channels
    terminate_tx: cbc::Sender<()>,
    terminate_rx: cbc::Receiver<()>,
    state_tx: cbc::Sender<CarState>,
    state_rx: cbc::Receiver<CarState>,
    delivered_tx: cbc::Sender<Person>,
    delivered_rx: cbc::Receiver<Person>,
}

impl Simulation {
    pub fn initialize(
        config: ElevatorConfig,
        animator: Box<dyn Animator>,
    ) -> Result<Simulation, ConfigError> {
        config.validate()?;

        let building = Building::new(config.n_floors, config.capacity, config.start_floor);
        let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();
        let (state_tx, state_rx) = cbc::bounded::<CarState>(STATE_BUFFER);
        let (delivered_tx, delivered_rx) = cbc::bounded::<Person>(DELIVERY_BUFFER);

        info!(
            "Building with {} floors, car capacity {}, car on floor {}",
            config.n_floors, config.capacity, config.start_floor
        );

        Ok(Simulation {
            building: Arc::new(Mutex::new(building)),
            config,
            rng: Mutex::new(StdRng::from_entropy()),
            animator: Mutex::new(Some(animator)),
            running: AtomicBool::new(false),
            dispatcher_thread: Mutex::new(None),
            terminate_tx,
            terminate_rx,
            state_tx,
            state_rx,
            delivered_tx,
            delivered_rx,
        })
    }

    /// Makes the target floors of spawned people reproducible.
    pub fn with_seed(self, seed: u64) -> Simulation {
        *lock(&self.rng) = StdRng::seed_from_u64(seed);
        self
    }

    /// Arrival entry point. `None` for a floor outside the building.
    pub fn spawn_person(&self, floor: u32) -> Option<Person> {
        let mut rng = lock(&self.rng);
        self.building().queues.spawn(floor, &mut *rng)
    }

    /// Queues a person built by the caller. Refused for anyone currently
    /// riding the car.
    pub fn enqueue(&self, person: Person) -> bool {
        let mut building = self.building();
        if building
            .car
            .passengers()
            .iter()
            .any(|rider| rider.id() == person.id())
        {
            warn!("{} is riding the car, not queued", person.id());
            return false;
        }
        building.queues.enqueue(person)
    }

    /// Starts the dispatcher thread. Returns `false` if it is already running
    /// or has been stopped.
    pub fn run(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }

        let animator = match lock(&self.animator).take() {
            Some(animator) => animator,
            None => {
                warn!("Dispatcher was stopped and cannot be restarted");
                self.running.store(false, Ordering::SeqCst);
                return false;
            }
        };

        let dispatcher = Dispatcher::new(
            self.building.clone(),
            animator,
            &self.config,
            self.state_tx.clone(),
            self.delivered_tx.clone(),
            self.terminate_rx.clone(),
        );

        let dispatcher_thread = Builder::new().name("dispatcher".into());
        match dispatcher_thread.spawn(move || dispatcher.run()) {
            Ok(handle) => {
                *lock(&self.dispatcher_thread) = Some(handle);
                true
            }
            Err(e) => {
                warn!("Failed to spawn dispatcher thread: {}", e);
                self.running.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the dispatcher and waits for it. The car keeps the last floor
    /// it fully reached.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.terminate_tx.send(());

        if let Some(handle) = lock(&self.dispatcher_thread).take() {
            if handle.join().is_err() {
                warn!("Dispatcher thread panicked");
            }
        }
    }

    /***************************************/
    /*              Queries                */
    /***************************************/
    pub fn floor_count(&self) -> u32 {
        self.config.n_floors
    }

    pub fn waiting(&self, floor: u32) -> Vec<Person> {
        self.building().queues.all_waiting(floor)
    }

    pub fn queue_len(&self, floor: u32) -> usize {
        self.building().queues.queue_len(floor)
    }

    pub fn total_waiting(&self) -> usize {
        self.building().queues.total_waiting()
    }

    pub fn car_state(&self) -> CarState {
        self.building().car_state()
    }

    /// Snapshots published by the dispatcher. Intended for a single consumer.
    pub fn subscribe_state(&self) -> cbc::Receiver<CarState> {
        self.state_rx.clone()
    }

    /// People who reached their target floor. Intended for a single consumer.
    pub fn deliveries(&self) -> cbc::Receiver<Person> {
        self.delivered_rx.clone()
    }

    fn building(&self) -> MutexGuard<'_, Building> {
        lock(&self.building)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
