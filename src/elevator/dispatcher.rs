use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::building::{Building, Person};
use crate::config::ElevatorConfig;
use crate::elevator::animation::{Animator, MoveHandle};
use crate::elevator::plan;
use crate::shared::{Behaviour, CarState, Direction};

/**
 * Runs the elevator.
 *
 * The `Dispatcher` repeatedly decides the car's next target, drives the car
 * there through the animator stopping wherever people get on or off, and
 * serves each stop (dwell, unload, load). It is the only writer of car state
 * and only holds the building lock between waits, so arrivals can be queued
 * at any time.
 *
 * # Fields
 * - `building`:        Waiting lists and car, shared with the simulation facade.
 * - `animator`:        Performs timed car movement and walk-off effects.
 * - `config`:          Travel, dwell, idle poll and walk timings.
 * - `state_tx`:        Publishes a car snapshot after every state change.
 * - `delivered_tx`:    Publishes every person who reached their floor.
 * - `terminate_rx`:    Stops the dispatcher. An in-flight move is cancelled.
 */

enum Decision {
    Quiet,
    NoTarget,
    Travel(u32),
}

struct Terminated;

pub struct Dispatcher {
    building: Arc<Mutex<Building>>,
    animator: Box<dyn Animator>,
    config: ElevatorConfig,
    state_tx: cbc::Sender<CarState>,
    delivered_tx: cbc::Sender<Person>,
    terminate_rx: cbc::Receiver<()>,
}

impl Dispatcher {
    pub fn new(
        building: Arc<Mutex<Building>>,
        animator: Box<dyn Animator>,
        config: &ElevatorConfig,
        state_tx: cbc::Sender<CarState>,
        delivered_tx: cbc::Sender<Person>,
        terminate_rx: cbc::Receiver<()>,
    ) -> Dispatcher {
        Dispatcher {
            building,
            animator,
            config: config.clone(),
            state_tx,
            delivered_tx,
            terminate_rx,
        }
    }

    pub fn run(mut self) {
        info!("Dispatcher started");
        self.publish_state();

        while self.cycle().is_ok() {}

        self.lock().behaviour = Behaviour::Idle;
        self.publish_state();
        info!("Dispatcher terminated");
    }

    fn cycle(&mut self) -> Result<(), Terminated> {
        match self.decide() {
            Decision::Quiet => {
                self.set_behaviour(Behaviour::Idle);
                self.wait(self.config.idle_poll_interval())
            }
            Decision::NoTarget => {
                debug!("No eligible target, polling again");
                self.set_behaviour(Behaviour::Idle);
                self.wait(self.config.idle_poll_interval())
            }
            Decision::Travel(target) => self.travel_to(target),
        }
    }

    fn decide(&self) -> Decision {
        let mut building = self.lock();

        if building.is_quiet() {
            building.car.set_direction(Direction::Idle);
            return Decision::Quiet;
        }

        match plan::choose_target(&mut building) {
            Some(target) => {
                debug!(
                    "Target floor {} (car on {}, going {})",
                    target,
                    building.car.current_floor(),
                    building.car.direction()
                );
                Decision::Travel(target)
            }
            None => Decision::NoTarget,
        }
    }

    /// Serves every planned stop up to and including `target`. The plan is
    /// recomputed after each stop so new passengers' floors are picked up.
    fn travel_to(&mut self, target: u32) -> Result<(), Terminated> {
        loop {
            let stop = {
                let building = self.lock();
                plan::travel_plan(&building, target)
                    .first()
                    .copied()
                    .unwrap_or(target)
            };

            self.serve_stop(stop)?;

            if stop == target {
                return Ok(());
            }
        }
    }

    fn serve_stop(&mut self, stop: u32) -> Result<(), Terminated> {
        let from = self.lock().car.current_floor();

        if stop != from {
            self.set_behaviour(Behaviour::EnRoute);
            let duration = self.config.floor_travel_time() * from.abs_diff(stop);
            info!("Moving from floor {} to floor {} ({:?})", from, stop, duration);

            let handle = self.animator.move_car(from, stop, duration);
            self.await_effect(handle)?;
            self.lock().car.set_floor(stop);
        }

        self.set_behaviour(Behaviour::Serving);
        self.wait(self.config.dwell_time())?;

        let delivered = self.lock().car.alight_at_current_floor();
        for person in delivered.iter() {
            info!("{} delivered to floor {}", person.id(), person.current_floor());
            let _ = self.delivered_tx.try_send(person.clone());
        }
        // People walk off one after the other
        for person in delivered.iter() {
            let handle = self.animator.walk_off(person, self.config.walk_time());
            self.await_effect(handle)?;
        }

        let boarded = {
            let mut building = self.lock();
            if plan::reverse_at_sweep_end(&mut building) {
                debug!(
                    "End of sweep on floor {}, now going {}",
                    stop,
                    building.car.direction()
                );
            }
            plan::board_waiting(&mut building)
        };
        for person in boarded.iter() {
            info!(
                "{} boarded on floor {} for floor {}",
                person.id(),
                stop,
                person.target_floor()
            );
        }

        self.publish_state();
        Ok(())
    }

    fn await_effect(&self, handle: MoveHandle) -> Result<(), Terminated> {
        cbc::select! {
            recv(handle.done()) -> done => {
                if done.is_err() {
                    warn!("Animator dropped an effect without finishing it");
                }
                Ok(())
            }
            recv(self.terminate_rx) -> _ => {
                handle.cancel();
                Err(Terminated)
            }
        }
    }

    fn wait(&self, duration: Duration) -> Result<(), Terminated> {
        cbc::select! {
            recv(self.terminate_rx) -> _ => Err(Terminated),
            default(duration) => Ok(()),
        }
    }

    fn set_behaviour(&self, behaviour: Behaviour) {
        let changed = {
            let mut building = self.lock();
            let changed = building.behaviour != behaviour;
            building.behaviour = behaviour;
            changed
        };
        if changed {
            self.publish_state();
        }
    }

    fn publish_state(&self) {
        // Observers that fall behind miss snapshots, never the dispatcher
        let state = self.lock().car_state();
        let _ = self.state_tx.try_send(state);
    }

    fn lock(&self) -> MutexGuard<'_, Building> {
        self.building.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
